pub mod card;
pub mod compare;
pub mod deck;
pub mod hand;
pub mod pattern;
pub mod rank;
pub mod score;
pub mod seat;
pub mod suit;
pub mod table;
pub mod validate;
