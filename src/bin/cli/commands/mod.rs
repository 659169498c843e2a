pub mod clothes;
