// Input format readers
pub mod peter_txt;
