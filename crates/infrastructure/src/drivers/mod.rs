mod simulator;

pub use simulator::SimulatedPosDevice;
