pub mod bibox;
