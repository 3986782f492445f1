//! End-to-end scenarios through the public API.

use hack::cpu::{decode, Instruction};
use hack::{assemble, Cpu, Event, Level, NullSink, Ram, Wiring};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

const MULTIPLY: &str = r#"
// RAM[2] = RAM[0] * RAM[1]
    @2
    M=0
(LOOP)
    @1
    D=M
    @END
    D;JEQ
    @0
    D=M
    @2
    M=D+M
    @1
    M=M-1
    @LOOP
    0;JMP
(END)
    @END
    0;JMP
"#;

fn run_until_parked<M: hack::DataMemory>(cpu: &mut Cpu<M>, limit: u64) -> bool {
    while cpu.cycles < limit {
        let pc = cpu.pc();
        let instr = cpu.step();
        if cpu.is_parked(pc, &instr) {
            return true;
        }
    }
    false
}

#[test]
fn store_five_line_by_line() {
    let mut cpu = Cpu::new().sink(NullSink);
    cpu.load("@5", 0).unwrap();
    cpu.load("D=A", 1).unwrap();
    cpu.load("@0", 2).unwrap();
    cpu.load("M=D", 3).unwrap();

    for _ in 0..4 {
        cpu.step();
    }

    assert_eq!(cpu.d(), 5);
    assert_eq!(cpu.ram().read(0), 5);
    assert_eq!(cpu.pc(), 4);
}

#[test]
fn multiply_program() {
    let program = assemble(MULTIPLY).unwrap();
    let mut cpu = Cpu::new().sink(NullSink);
    cpu.load_program(&program.words).unwrap();
    cpu.ram_mut().write(0, 6);
    cpu.ram_mut().write(1, 7);

    assert!(run_until_parked(&mut cpu, 10_000));
    assert_eq!(cpu.ram().read(2), 42);
    assert_eq!(cpu.ram().read(1), 0);
    assert!(program.variables().is_empty());
}

#[test]
fn multiply_negative_operand() {
    let program = assemble(MULTIPLY).unwrap();
    let mut cpu = Cpu::new().sink(NullSink);
    cpu.load_program(&program.words).unwrap();
    cpu.ram_mut().write(0, (-3i16) as u16);
    cpu.ram_mut().write(1, 4);

    assert!(run_until_parked(&mut cpu, 10_000));
    assert_eq!(cpu.ram().read(2) as i16, -12);
}

#[test]
fn program_writes_into_threaded_ram() {
    let ram = Arc::new(Mutex::new(Ram::new()));
    {
        let mut ram = ram.lock().unwrap();
        ram.write(0, 3);
        ram.write(1, 5);
    }

    let handle = Arc::clone(&ram);
    let parked = std::thread::spawn(move || {
        let program = assemble(MULTIPLY).unwrap();
        let mut cpu = Cpu::with_ram(handle).sink(NullSink);
        cpu.load_program(&program.words).unwrap();
        run_until_parked(&mut cpu, 10_000)
    })
    .join()
    .unwrap();

    assert!(parked);
    assert_eq!(ram.lock().unwrap().read(2), 15);
}

#[test]
fn legacy_wiring_differs_from_canonical() {
    let lines = ["@5", "D=A", "@0", "M=D"];

    let mut canonical = Cpu::new().sink(NullSink);
    let mut legacy = Cpu::new().wiring(Wiring::Legacy).sink(NullSink);
    for (addr, line) in lines.iter().enumerate() {
        canonical.load(line, addr as u16).unwrap();
        legacy.load(line, addr as u16).unwrap();
    }
    canonical.run(4);
    legacy.run(4);

    assert_eq!(canonical.d(), 5);
    assert_ne!(legacy.d(), canonical.d());
    assert_eq!(legacy.pc(), 4);
}

#[test]
fn step_reports_each_cycle() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&events);
    let mut cpu = Cpu::new().sink(move |level: Level, event: &Event| {
        if level == Level::Log {
            log.borrow_mut().push(event.clone());
        }
    });
    cpu.load("@9", 0).unwrap();
    cpu.load("D=A+1", 1).unwrap();
    cpu.run(2);

    let events = events.borrow();
    assert_eq!(events.len(), 2);
    match &events[1] {
        Event::Stepped { registers, .. } => {
            assert_eq!(registers.d, 10);
            assert_eq!(registers.pc, 2);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn decode_rejects_wide_words() {
    assert!(decode(0x1_0000).is_err());
    assert_eq!(decode(7).unwrap(), Instruction::Address { value: 7 });
}
