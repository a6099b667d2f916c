/// TLV field tree
pub mod field;
/// Merchant summary
pub mod info;
/// Payload view and mutators
pub mod payload;
/// Two-digit tag type
pub mod tag;

pub use field::{Field, FieldValue};
pub use info::MerchantInfo;
pub use payload::{MerchantField, Mutation, Payload};
pub use tag::Tag;
