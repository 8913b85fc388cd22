pub mod audit_logs;
pub mod categories;
pub mod order_positions;
pub mod orders;
pub mod product_categories;
pub mod product_tags;
pub mod products;
pub mod tags;
pub mod user_permissions;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use order_positions::Entity as OrderPositions;
pub use orders::Entity as Orders;
pub use product_categories::Entity as ProductCategories;
pub use product_tags::Entity as ProductTags;
pub use products::Entity as Products;
pub use tags::Entity as Tags;
pub use user_permissions::Entity as UserPermissions;
pub use users::Entity as Users;
