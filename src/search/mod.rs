pub mod minimax;
