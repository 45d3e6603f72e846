use procgate::registry::{self, ProcGroup};

/// The identifier-to-arity mapping is the binding contract with the database
/// schema: positional binds line up with each procedure's declared parameters.
#[test]
fn arity_contract_is_exact() {
    let expected: &[(&str, usize)] = &[
        ("TopUpBalance", 4),
        ("StartSession", 3),
        ("EndSession", 1),
        ("AddProductToSession", 3),
        ("CreateInvoiceForSession", 3),
        ("CheckAvailableMachines", 0),
        ("LockMachine", 2),
        ("UnlockMachine", 1),
        ("GetMachineStatusStats", 0),
        ("GetMachineUsageStats", 3),
        ("RegisterNewPlayer", 4),
        ("CheckPlayerBalance", 3),
        ("GetPlayerHistory", 1),
        ("GiveNewAccountBonus", 3),
        ("UpgradeMemberType", 1),
        ("DowngradeInactiveMembers", 0),
        ("GetRevenueReport", 2),
        ("GetProductSalesStats", 2),
        ("GetTopAndBottomProducts", 5),
        ("GetEmployeeCount", 0),
    ];
    assert_eq!(registry::all().len(), expected.len());
    for (name, arity) in expected {
        let def = registry::lookup(name).unwrap_or_else(|| panic!("{} not registered", name));
        assert_eq!(def.arity(), *arity, "arity drift for {}", name);
    }
}

#[test]
fn identifiers_are_unique() {
    let mut seen = std::collections::HashSet::new();
    for def in registry::all() {
        assert!(seen.insert(def.name), "duplicate identifier: {}", def.name);
    }
}

#[test]
fn lookup_is_exact_match_only() {
    assert!(registry::lookup("EndSession").is_some());
    assert!(registry::lookup("endsession").is_none());
    assert!(registry::lookup("EndSession ").is_none());
    assert!(registry::lookup("DropAllTables").is_none());
}

#[test]
fn groups_partition_the_registry() {
    let total: usize = ProcGroup::ALL.iter().map(|g| registry::in_group(*g).count()).sum();
    assert_eq!(total, registry::all().len());
    assert_eq!(registry::in_group(ProcGroup::Session).count(), 5);
    assert_eq!(registry::in_group(ProcGroup::Machines).count(), 5);
    assert_eq!(registry::in_group(ProcGroup::Players).count(), 6);
    assert_eq!(registry::in_group(ProcGroup::Reports).count(), 4);
}

#[test]
fn every_entry_has_display_metadata() {
    for def in registry::all() {
        assert!(!def.title.is_empty(), "{} has no title", def.name);
        for label in def.params {
            assert!(!label.is_empty(), "{} has an empty parameter label", def.name);
        }
    }
}
