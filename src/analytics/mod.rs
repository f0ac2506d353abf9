//! Request analytics: a JSONL log of served dashboard requests and the
//! reporter behind `marketscope stats`.

pub mod logger;
pub mod reporter;
