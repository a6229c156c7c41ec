pub mod minichess;
