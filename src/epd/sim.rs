//! Simulated transport for host-side tests and emulation
//!
//! [`SimTransport`] records every primitive the controller issues and plays
//! back a scripted busy line. Nothing here touches hardware, so protocol
//! sequencing, timeouts and size checks can be verified deterministically.

use display_interface::DisplayError;

use crate::epd::interface::{ControlLine, Level, Transport};

/// One recorded transport primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `write_command`
    Command(u8),
    /// `write_data`
    Data(Vec<u8>),
    /// `set_control_line`
    Line(ControlLine, Level),
    /// `read_busy_line` and the level that was returned
    BusyRead(Level),
    /// `delay_ms`
    Delay(u32),
}

/// How the simulated busy line behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyScript {
    /// Always reports idle
    Idle,
    /// Reports busy for this many reads after every command, then idle
    BusyAfterCommand(u32),
    /// Never clears
    Stuck,
    /// Idle until the n-th command (counted from when the script was set),
    /// busy for good from then on
    StuckFromCommand(u32),
}

/// Recording [`Transport`] with a scripted busy line.
#[derive(Debug, Clone)]
pub struct SimTransport {
    busy_level: Level,
    script: BusyScript,
    reads_since_command: u32,
    commands_sent: u32,
    fail_writes: bool,
    events: Vec<Event>,
}

impl SimTransport {
    /// A transport whose busy line is `busy_level` while busy, idle otherwise.
    pub fn new(busy_level: Level, script: BusyScript) -> Self {
        SimTransport {
            busy_level,
            script,
            reads_since_command: 0,
            commands_sent: 0,
            fail_writes: false,
            events: Vec::new(),
        }
    }

    /// A transport that never reports busy
    pub fn idle(busy_level: Level) -> Self {
        Self::new(busy_level, BusyScript::Idle)
    }

    /// Change the busy script from now on
    pub fn set_script(&mut self, script: BusyScript) {
        self.script = script;
        self.reads_since_command = 0;
        self.commands_sent = 0;
    }

    /// Make every following command/data write fail with a bus error
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Everything recorded so far, in order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Forget the recorded events
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Command bytes in the order they were sent
    pub fn commands(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Command(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Data bursts in the order they were sent
    pub fn data_bursts(&self) -> Vec<&[u8]> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Data(d) => Some(d.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Data that followed the first occurrence of `command`, concatenated
    /// up to the next command
    pub fn data_after(&self, command: u8) -> Option<Vec<u8>> {
        let start = self
            .events
            .iter()
            .position(|e| *e == Event::Command(command))?;
        let mut out = Vec::new();
        for event in &self.events[start + 1..] {
            match event {
                Event::Data(d) => out.extend_from_slice(d),
                Event::Command(_) => break,
                _ => {}
            }
        }
        Some(out)
    }

    /// Number of command and data writes
    pub fn write_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Command(_) | Event::Data(_)))
            .count()
    }

    /// Number of busy samples taken
    pub fn busy_reads(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::BusyRead(_)))
            .count()
    }

    /// Total simulated delay in milliseconds
    pub fn total_delay_ms(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match e {
                Event::Delay(ms) => u64::from(*ms),
                _ => 0,
            })
            .sum()
    }
}

impl Transport for SimTransport {
    fn write_command(&mut self, command: u8) -> Result<(), DisplayError> {
        if self.fail_writes {
            return Err(DisplayError::BusWriteError);
        }
        self.reads_since_command = 0;
        self.commands_sent = self.commands_sent.saturating_add(1);
        self.events.push(Event::Command(command));
        Ok(())
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        if self.fail_writes {
            return Err(DisplayError::BusWriteError);
        }
        self.events.push(Event::Data(data.to_vec()));
        Ok(())
    }

    fn set_control_line(&mut self, line: ControlLine, level: Level) -> Result<(), DisplayError> {
        self.events.push(Event::Line(line, level));
        Ok(())
    }

    fn read_busy_line(&mut self) -> Result<Level, DisplayError> {
        let busy = match self.script {
            BusyScript::Idle => false,
            BusyScript::Stuck => true,
            BusyScript::BusyAfterCommand(n) => self.reads_since_command < n,
            BusyScript::StuckFromCommand(n) => self.commands_sent >= n,
        };
        self.reads_since_command = self.reads_since_command.saturating_add(1);

        let level = if busy {
            self.busy_level
        } else {
            self.busy_level.inverted()
        };
        self.events.push(Event::BusyRead(level));
        Ok(level)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.events.push(Event::Delay(ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_after_command_clears_after_n_reads() {
        let mut sim = SimTransport::new(Level::High, BusyScript::BusyAfterCommand(2));
        sim.write_command(0x20).unwrap();
        assert_eq!(sim.read_busy_line().unwrap(), Level::High);
        assert_eq!(sim.read_busy_line().unwrap(), Level::High);
        assert_eq!(sim.read_busy_line().unwrap(), Level::Low);

        // next command re-arms the busy period
        sim.write_command(0x12).unwrap();
        assert_eq!(sim.read_busy_line().unwrap(), Level::High);
    }

    #[test]
    fn stuck_from_command_sticks_once_reached() {
        let mut sim = SimTransport::new(Level::High, BusyScript::StuckFromCommand(2));
        sim.write_command(0x01).unwrap();
        assert_eq!(sim.read_busy_line().unwrap(), Level::Low);
        sim.write_command(0x02).unwrap();
        assert_eq!(sim.read_busy_line().unwrap(), Level::High);
        sim.write_command(0x03).unwrap();
        for _ in 0..10 {
            assert_eq!(sim.read_busy_line().unwrap(), Level::High);
        }

        // counting restarts with a new script
        sim.set_script(BusyScript::StuckFromCommand(1));
        assert_eq!(sim.read_busy_line().unwrap(), Level::Low);
    }

    #[test]
    fn active_low_busy_is_inverted() {
        let mut sim = SimTransport::new(Level::Low, BusyScript::Stuck);
        assert_eq!(sim.read_busy_line().unwrap(), Level::Low);
        sim.set_script(BusyScript::Idle);
        assert_eq!(sim.read_busy_line().unwrap(), Level::High);
    }

    #[test]
    fn data_after_concatenates_until_next_command() {
        let mut sim = SimTransport::idle(Level::High);
        sim.write_command(0x44).unwrap();
        sim.write_data(&[0x00]).unwrap();
        sim.write_data(&[0x1F]).unwrap();
        sim.write_command(0x45).unwrap();
        sim.write_data(&[0x01]).unwrap();

        assert_eq!(sim.data_after(0x44), Some(vec![0x00, 0x1F]));
        assert_eq!(sim.data_after(0x99), None);
        assert_eq!(sim.commands(), vec![0x44, 0x45]);
        assert_eq!(sim.data_bursts(), vec![&[0x00][..], &[0x1F][..], &[0x01][..]]);
        assert_eq!(sim.write_count(), 5);
    }

    #[test]
    fn failing_writes_are_not_recorded() {
        let mut sim = SimTransport::idle(Level::High);
        sim.fail_writes(true);
        assert!(sim.write_command(0x10).is_err());
        assert!(sim.write_data(&[1]).is_err());
        assert_eq!(sim.write_count(), 0);
    }
}
