//! Static registry of invocable stored procedures.
//!
//! Each entry names a procedure in the backing database together with a
//! display title, its functional group and the ordered labels of its
//! positional parameters. The registry is the single source of truth both for
//! building input forms and for enumerating the catalog scan; adding a
//! procedure is a data change here, never a code change elsewhere.
//!
//! Parameter descriptors carry labels only. Types, defaults and validation
//! stay out of the registry: the database engine is the sole authority on
//! coercing the submitted text, and declared parameter order must match the
//! positional order the procedure expects.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcGroup {
    Session,
    Machines,
    Players,
    Reports,
}

impl ProcGroup {
    pub const ALL: [ProcGroup; 4] = [
        ProcGroup::Session,
        ProcGroup::Machines,
        ProcGroup::Players,
        ProcGroup::Reports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcGroup::Session => "session",
            ProcGroup::Machines => "machines",
            ProcGroup::Players => "players",
            ProcGroup::Reports => "reports",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcGroup::Session => "Session management",
            ProcGroup::Machines => "Machine management",
            ProcGroup::Players => "Member management",
            ProcGroup::Reports => "Reports & statistics",
        }
    }
}

/// One invocable procedure: identifier, display title, group and the ordered
/// labels of its positional parameters (may be empty).
#[derive(Clone, Copy, Debug)]
pub struct ProcedureDef {
    pub name: &'static str,
    pub title: &'static str,
    pub group: ProcGroup,
    pub params: &'static [&'static str],
}

impl ProcedureDef {
    /// Number of positional arguments the underlying procedure expects.
    pub fn arity(&self) -> usize { self.params.len() }
}

pub const PROCEDURES: &[ProcedureDef] = &[
    // Session management
    ProcedureDef {
        name: "TopUpBalance",
        title: "Top up a player's balance",
        group: ProcGroup::Session,
        params: &["Player ID", "Handling staff ID", "Amount (VND)", "Transaction note"],
    },
    ProcedureDef {
        name: "StartSession",
        title: "Start a play session",
        group: ProcGroup::Session,
        params: &["Machine ID", "Player ID (leave blank for walk-in)", "Handling staff ID"],
    },
    ProcedureDef {
        name: "EndSession",
        title: "End a play session",
        group: ProcGroup::Session,
        params: &["Session ID"],
    },
    ProcedureDef {
        name: "AddProductToSession",
        title: "Order food / services for a session",
        group: ProcGroup::Session,
        params: &["Session ID", "Product ID", "Quantity"],
    },
    ProcedureDef {
        name: "CreateInvoiceForSession",
        title: "Create an invoice and settle a session",
        group: ProcGroup::Session,
        params: &["Session ID", "Cashier staff ID", "Payment method (Cash/Transfer/Member Balance)"],
    },
    // Machine management
    ProcedureDef {
        name: "CheckAvailableMachines",
        title: "List free machines",
        group: ProcGroup::Machines,
        params: &[],
    },
    ProcedureDef {
        name: "LockMachine",
        title: "Lock a machine for maintenance",
        group: ProcGroup::Machines,
        params: &["Machine ID", "Lock reason"],
    },
    ProcedureDef {
        name: "UnlockMachine",
        title: "Unlock a machine",
        group: ProcGroup::Machines,
        params: &["Machine ID"],
    },
    ProcedureDef {
        name: "GetMachineStatusStats",
        title: "Machine status overview",
        group: ProcGroup::Machines,
        params: &[],
    },
    ProcedureDef {
        name: "GetMachineUsageStats",
        title: "Machine usage report",
        group: ProcGroup::Machines,
        params: &["Start date (YYYY-MM-DD)", "End date (YYYY-MM-DD)", "Machine ID (leave blank for all)"],
    },
    // Member management
    ProcedureDef {
        name: "RegisterNewPlayer",
        title: "Register a new member account",
        group: ProcGroup::Players,
        params: &["Full name", "Phone number", "Account name", "Password"],
    },
    ProcedureDef {
        name: "CheckPlayerBalance",
        title: "Check an account balance",
        group: ProcGroup::Players,
        params: &["Player ID to inspect", "Caller ID", "Caller role (Player/Staff/Owner)"],
    },
    ProcedureDef {
        name: "GetPlayerHistory",
        title: "Play and transaction history",
        group: ProcGroup::Players,
        params: &["Player ID"],
    },
    ProcedureDef {
        name: "GiveNewAccountBonus",
        title: "Grant a new-account bonus",
        group: ProcGroup::Players,
        params: &["Player ID", "Bonus amount", "Handling staff ID"],
    },
    ProcedureDef {
        name: "UpgradeMemberType",
        title: "Evaluate a member tier upgrade (VIP/SVIP)",
        group: ProcGroup::Players,
        params: &["Player ID"],
    },
    ProcedureDef {
        name: "DowngradeInactiveMembers",
        title: "Downgrade inactive members",
        group: ProcGroup::Players,
        params: &[],
    },
    // Reports & statistics
    ProcedureDef {
        name: "GetRevenueReport",
        title: "Daily revenue report",
        group: ProcGroup::Reports,
        params: &["Start date (YYYY-MM-DD)", "End date (YYYY-MM-DD)"],
    },
    ProcedureDef {
        name: "GetProductSalesStats",
        title: "Product sales statistics",
        group: ProcGroup::Reports,
        params: &["Start date (YYYY-MM-DD)", "End date (YYYY-MM-DD)"],
    },
    ProcedureDef {
        name: "GetTopAndBottomProducts",
        title: "Best-selling / slow / unsold products",
        group: ProcGroup::Reports,
        params: &[
            "Stat kind (1: top sellers, 2: slow sellers, 3: never sold)",
            "Start date",
            "End date",
            "Top N (e.g. 5, 10)",
            "Product kind (Food/Drink/Card/Other Service)",
        ],
    },
    ProcedureDef {
        name: "GetEmployeeCount",
        title: "Staffing statistics",
        group: ProcGroup::Reports,
        params: &[],
    },
];

static BY_NAME: Lazy<HashMap<&'static str, &'static ProcedureDef>> = Lazy::new(|| {
    let mut index = HashMap::with_capacity(PROCEDURES.len());
    for def in PROCEDURES {
        if index.insert(def.name, def).is_some() {
            panic!("duplicate procedure identifier: {}", def.name);
        }
    }
    index
});

/// Resolve an identifier to its descriptor. Exact match only; identifiers are
/// fixed at startup and never registered dynamically.
pub fn lookup(name: &str) -> Option<&'static ProcedureDef> {
    BY_NAME.get(name).copied()
}

/// All registered procedures in declaration order.
pub fn all() -> &'static [ProcedureDef] {
    PROCEDURES
}

/// Procedures of one group, in declaration order.
pub fn in_group(group: ProcGroup) -> impl Iterator<Item = &'static ProcedureDef> {
    PROCEDURES.iter().filter(move |d| d.group == group)
}
