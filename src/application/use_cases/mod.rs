pub mod coach;
pub mod identity;
pub mod meal_plan;
pub mod user;
