pub mod session_gate;
