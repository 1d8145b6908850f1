//! Protocol spellings of request arguments, operators, and nested operations.

pub mod args {
    pub const WHERE: &str = "where";
    pub const DATA: &str = "data";
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const CURSOR: &str = "cursor";
    pub const TAKE: &str = "take";
    pub const SKIP: &str = "skip";
    pub const ORDER_BY: &str = "orderBy";
    pub const DISTINCT: &str = "distinct";
    pub const SELECT: &str = "select";
    pub const INCLUDE: &str = "include";
    pub const BY: &str = "by";
    pub const HAVING: &str = "having";
    pub const SKIP_DUPLICATES: &str = "skipDuplicates";
}

pub mod filters {
    pub const AND: &str = "AND";
    pub const OR: &str = "OR";
    pub const NOT: &str = "NOT";
    pub const NOT_FIELD: &str = "not";
    pub const MODE: &str = "mode";
    pub const PATH: &str = "path";
    pub const INSENSITIVE: &str = "insensitive";
    pub const DEFAULT: &str = "default";

    // relation filters
    pub const EVERY: &str = "every";
    pub const SOME: &str = "some";
    pub const NONE: &str = "none";
    pub const IS: &str = "is";
    pub const IS_NOT: &str = "isNot";
}

pub mod ordering {
    pub const ASC: &str = "asc";
    pub const DESC: &str = "desc";
    pub const SORT: &str = "sort";
    pub const NULLS: &str = "nulls";
    pub const FIRST: &str = "first";
    pub const LAST: &str = "last";
}

pub mod aggregations {
    pub const COUNT: &str = "_count";
    pub const AVG: &str = "_avg";
    pub const SUM: &str = "_sum";
    pub const MIN: &str = "_min";
    pub const MAX: &str = "_max";
    pub const ALL: &str = "_all";
}

pub mod operations {
    pub const SET: &str = "set";
    pub const PUSH: &str = "push";
    pub const INCREMENT: &str = "increment";
    pub const DECREMENT: &str = "decrement";
    pub const MULTIPLY: &str = "multiply";
    pub const DIVIDE: &str = "divide";
}

pub mod nested {
    pub const CREATE: &str = "create";
    pub const CREATE_MANY: &str = "createMany";
    pub const CONNECT: &str = "connect";
    pub const CONNECT_OR_CREATE: &str = "connectOrCreate";
    pub const SET: &str = "set";
    pub const DISCONNECT: &str = "disconnect";
    pub const DELETE: &str = "delete";
    pub const UPDATE: &str = "update";
    pub const UPDATE_MANY: &str = "updateMany";
    pub const UPSERT: &str = "upsert";
    pub const DELETE_MANY: &str = "deleteMany";
}
