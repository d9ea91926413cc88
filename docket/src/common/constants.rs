// doc constants
pub const DOC_ID: &str = "_id";
pub const FIELD_SEPARATOR: &str = ".";

// configuration constants
pub const DEFAULT_CONNECTION_ENTRY: &str = "DOCKET_SERVER_SETTINGS";
pub const MEMORY_SCHEME: &str = "memory";
pub const MONGODB_SCHEME: &str = "mongodb";
pub const MONGODB_SRV_SCHEME: &str = "mongodb+srv";

// query operators
pub const OP_EQ: &str = "$eq";
pub const OP_NE: &str = "$ne";
pub const OP_GT: &str = "$gt";
pub const OP_GTE: &str = "$gte";
pub const OP_LT: &str = "$lt";
pub const OP_LTE: &str = "$lte";
pub const OP_IN: &str = "$in";
pub const OP_NIN: &str = "$nin";
pub const OP_EXISTS: &str = "$exists";
pub const OP_REGEX: &str = "$regex";
pub const OP_OPTIONS: &str = "$options";
pub const OP_AND: &str = "$and";
pub const OP_OR: &str = "$or";
pub const OP_NOR: &str = "$nor";
