//! Debugger application state and logic.

use crate::asm::{disassemble_word, Program};
use crate::cpu::{Cpu, Wiring, MEMORY_SIZE};
use crate::diag::NullSink;
use std::collections::HashSet;

/// Debugger application state.
pub struct DebuggerApp {
    /// The CPU being debugged.
    pub cpu: Cpu,
    /// Original program for reference.
    pub program: Program,
    /// Breakpoints (by ROM address).
    pub breakpoints: HashSet<u16>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// First RAM address shown in the memory view.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(program: Program) -> Self {
        let mut app = Self {
            cpu: Cpu::new(),
            program,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: String::new(),
            mem_scroll: 0,
        };
        app.rebuild(Wiring::default());
        app.status = "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into();
        app
    }

    /// Fresh CPU with the program in ROM. Diagnostics are dropped so they
    /// cannot draw over the terminal.
    fn rebuild(&mut self, wiring: Wiring) {
        self.cpu = Cpu::new().wiring(wiring).sink(NullSink);
        if let Err(e) = self.cpu.load_program(&self.program.words) {
            self.status = format!("Error: {}", e);
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        let pc = self.cpu.pc();
        let instr = self.cpu.step();
        if self.cpu.is_parked(pc, &instr) {
            self.running = false;
            self.status = format!("Parked at PC={} after {} cycles", self.cpu.pc(), self.cpu.cycles);
        } else {
            self.status = format!("PC={:05}: {}", pc, instr);
        }
    }

    /// Start continuous execution.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        // Check for breakpoint
        let pc = self.cpu.pc();
        if self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at PC={}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.pc();
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={}", pc);
        }
    }

    /// Reset CPU to initial state, clearing RAM.
    pub fn reset(&mut self) {
        let wiring = self.cpu.current_wiring();
        self.rebuild(wiring);
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Switch between canonical and legacy wiring, keeping machine state.
    pub fn toggle_wiring(&mut self) {
        let wiring = match self.cpu.current_wiring() {
            Wiring::Canonical => Wiring::Legacy,
            Wiring::Legacy => Wiring::Canonical,
        };
        let cpu = std::mem::take(&mut self.cpu);
        self.cpu = cpu.wiring(wiring);
        self.status = format!("Wiring: {}", wiring);
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.mem_scroll = self.mem_scroll.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.mem_scroll = (self.mem_scroll + rows).min(MEMORY_SIZE - 1);
    }

    /// Get disassembly around current PC.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(u16, String, bool)> {
        let pc = self.cpu.pc() as usize;
        let start = pc.saturating_sub(lines / 2);

        (start..MEMORY_SIZE)
            .take(lines)
            .map(|addr| {
                let addr = addr as u16;
                let word = self.cpu.rom().read(addr);
                (addr, disassemble_word(word), addr as usize == pc)
            })
            .collect()
    }
}

/// Run the debugger with a program.
pub fn run_debugger(program: Program) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(program);

    // Main loop
    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        // Handle input
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Char('w') => app.toggle_wiring(),
                        KeyCode::Up => app.scroll_up(1),
                        KeyCode::Down => app.scroll_down(1),
                        KeyCode::PageUp => app.scroll_up(16),
                        KeyCode::PageDown => app.scroll_down(16),
                        _ => {}
                    }
                }
            }
        }

        // Tick for continuous running
        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
