/// Table holding shipping convoys
pub const CONVOYS_TABLE: &str = "convoys";

/// Table holding loyalty members
pub const USERS_TABLE: &str = "users";

/// Table holding loyalty point movements
pub const LOYALTY_TRANSACTIONS_TABLE: &str = "loyalty_transactions";

/// Table receiving support requests
pub const CONTACT_MESSAGES_TABLE: &str = "contact_messages";

/// Prefix of every loyalty client code
pub const CLIENT_CODE_PREFIX: &str = "IZI-";

/// FCFA value of a single loyalty point
pub const FCFA_PER_POINT: i64 = 100;
