use std::sync::mpsc;
use std::sync::mpsc::{Receiver, Sender};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EmitterCommand {
    /// Stop after the round in flight.
    Quit,
}

pub type EmitterCommandSender = Sender<EmitterCommand>;
pub type EmitterCommandReceiver = Receiver<EmitterCommand>;

pub fn command_channel() -> (EmitterCommandSender, EmitterCommandReceiver) {
    mpsc::channel()
}
