mod generate_id;

pub use generate_id::recipe_id;
