mod entity;
mod r#enum;
mod field;
mod relation;
mod unique;

pub use entity::EntityModel;
pub use r#enum::EnumModel;
pub use field::FieldModel;
pub use relation::RelationModel;
pub use unique::UniqueModel;
