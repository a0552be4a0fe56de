mod hex_id;
pub mod meal_plan;
pub mod user;
