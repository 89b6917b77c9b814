use std::time::{Duration, Instant};

use crossbeam_utils::thread;

use chip8_core::{
    embedded_graphics::{image::IntoPixelIter, pixelcolor::BinaryColor},
    Builder, Cadence, Chip8, Context, Error, FrameView, Step, Timers, HEIGHT, WIDTH,
};

macro_rules! schedule_for {
    ($scope:expr, $f:expr, $freq:expr, $timeout:expr) => {{
        let started = Instant::now();
        let period = Duration::from_nanos(1_000_000_000u64 / $freq);
        let mut previous = started;
        $scope.spawn(move |_| loop {
            let now = Instant::now();
            if now.duration_since(started) >= $timeout {
                break;
            }
            if now.duration_since(previous) >= period {
                $f();
                previous = now;
            }
        })
    }};
}

struct TestingContext(Vec<String>);

impl TestingContext {
    fn new() -> Self {
        let row: String = (0..WIDTH).map(|_| '.').collect();
        let mut inner = vec![];
        inner.resize_with(HEIGHT, || row.clone());
        Self(inner)
    }

    fn formatted(&self) -> String {
        self.0.join("\n") + "\n"
    }
}

impl Context for TestingContext {
    fn gen_random(&mut self) -> u8 {
        rand::random::<u8>()
    }

    fn on_frame(&mut self, frame: FrameView<'_>) {
        frame.as_raw_image().pixel_iter().for_each(|px| {
            let (x, y) = (px.0.x as usize, px.0.y as usize);
            self.0[y].replace_range(
                x..x + 1,
                match px.1 {
                    BinaryColor::On => "#",
                    BinaryColor::Off => ".",
                },
            );
        });
    }
}

/// Pad the top-left corner of a screen to full 64x32 ascii frame
fn screen(rows: &[&str]) -> String {
    (0..HEIGHT)
        .map(|y| {
            let row = rows.get(y).copied().unwrap_or("");
            format!("{:.<width$}\n", row, width = WIDTH)
        })
        .collect()
}

fn run_until<C: Context>(chip: &mut Chip8<'_, C>, pc: u16, timeout: Duration) -> Vec<Step> {
    let started = Instant::now();
    let mut steps = vec![];
    while chip.registers().pc != pc {
        assert!(started.elapsed() < timeout, "program didn't reach {:#05X}", pc);
        steps.push(chip.step().unwrap());
    }
    steps
}

#[test]
fn scheduler_ticks_at_frequency() {
    let timers = Timers::new();
    timers.set_delay(0xFF);
    let clock = &timers;
    thread::scope(|s| {
        schedule_for!(
            s,
            || {
                clock.tick();
            },
            60,
            Duration::from_millis(500)
        );
    })
    .unwrap();
    let ticks = 0xFF - timers.delay();
    assert!((25..=30).contains(&ticks), "ticked {} times", ticks);
}

#[test]
fn delay_timer_counts_down_while_stepping() {
    let _ = env_logger::builder().is_test(true).try_init();

    #[rustfmt::skip]
    let rom = [
        0x6A, 0x0A, // 200: VA = 10
        0xFA, 0x15, // 202: delay = VA
        0xFB, 0x07, // 204: VB = delay
        0x3B, 0x00, // 206: skip if VB == 0
        0x12, 0x04, // 208: jump 204
        0x12, 0x0A, // 20A: halt
    ];
    let timers = Timers::new();
    let mut chip = Builder::new()
        .with_context(TestingContext::new())
        .with_timers(&timers)
        .with_program(&rom)
        .build()
        .unwrap();

    let clock = &timers;
    let started = Instant::now();
    thread::scope(|s| {
        schedule_for!(
            s,
            || {
                clock.tick();
            },
            60,
            Duration::from_millis(600)
        );
        run_until(&mut chip, 0x20A, Duration::from_secs(5));
    })
    .unwrap();

    // 10 ticks of a 60 Hz clock
    assert!(started.elapsed() >= Duration::from_millis(150));
    assert_eq!(chip.registers().v[0xB], 0);
    assert_eq!(timers.delay(), 0);
}

#[test]
fn sound_timer_reports_finish() {
    let _ = env_logger::builder().is_test(true).try_init();

    let timers = Timers::new();
    let mut chip = Builder::new()
        .with_context(TestingContext::new())
        .with_timers(&timers)
        .with_program(&[0x60, 0x03, 0xF0, 0x18])
        .build()
        .unwrap();
    chip.step().unwrap();
    chip.step().unwrap();
    assert!(timers.is_sound_on());

    let mut cadence = Cadence::default();
    let due = cadence.advance(Duration::from_millis(50));
    assert_eq!(due, 3);
    let states: Vec<_> = (0..due).map(|_| timers.tick()).collect();
    assert_eq!(
        states,
        [
            chip8_core::TimerState::On,
            chip8_core::TimerState::On,
            chip8_core::TimerState::Finished
        ]
    );
    assert!(!timers.is_sound_on());
}

#[test]
fn draw_bcd_digits() {
    let _ = env_logger::builder().is_test(true).try_init();

    #[rustfmt::skip]
    let rom = [
        0x60, 0x89, // 200: V0 = 137
        0xA3, 0x00, // 202: I = 300
        0xF0, 0x33, // 204: BCD of V0 at I
        0xF2, 0x65, // 206: load V0..=V2
        0x63, 0x00, // 208: V3 = 0
        0x64, 0x00, // 20A: V4 = 0
        0xF0, 0x29, // 20C: I = glyph of V0
        0xD3, 0x45, // 20E: draw
        0x73, 0x05, // 210: V3 += 5
        0xF1, 0x29, // 212: I = glyph of V1
        0xD3, 0x45, // 214: draw
        0x73, 0x05, // 216: V3 += 5
        0xF2, 0x29, // 218: I = glyph of V2
        0xD3, 0x45, // 21A: draw
        0x12, 0x1C, // 21C: halt
    ];
    let timers = Timers::new();
    let mut chip = Builder::new()
        .with_context(TestingContext::new())
        .with_timers(&timers)
        .with_program(&rom)
        .build()
        .unwrap();

    let steps = run_until(&mut chip, 0x21C, Duration::from_secs(1));
    assert_eq!(steps.iter().filter(|s| s.draw_occurred).count(), 3);
    assert_eq!(chip.memory().slice(0x300, 3), Ok(&[1u8, 3, 7][..]));
    assert_eq!(chip.registers().v[0xF], 0);

    let lhs = chip.context().formatted();
    let rhs = screen(&[
        "..#..####.####",
        ".##.....#....#",
        "..#..####...#.",
        "..#.....#..#..",
        ".###.####..#..",
    ]);
    assert_eq!(&lhs, &rhs, "\nlhs:\n{}\n\nrhs:\n{}", lhs, rhs);
}

#[test]
fn wait_for_key_is_cooperative() {
    let _ = env_logger::builder().is_test(true).try_init();

    #[rustfmt::skip]
    let rom = [
        0xF5, 0x0A, // 200: V5 = next key
        0xE5, 0x9E, // 202: skip if V5 pressed
        0x12, 0x08, // 204: jump 208
        0x12, 0x06, // 206: halt
        0x12, 0x08, // 208: halt
    ];
    let timers = Timers::new();
    let mut chip = Builder::new()
        .with_context(TestingContext::new())
        .with_timers(&timers)
        .with_program(&rom)
        .build()
        .unwrap();

    for _ in 0..100 {
        assert_eq!(chip.step(), Err(nb::Error::WouldBlock));
    }
    assert!(chip.is_waiting_for_key());
    assert_eq!(chip.registers().pc, 0x200);

    chip.set_key(0xC, true).unwrap();
    run_until(&mut chip, 0x206, Duration::from_secs(1));
    assert_eq!(chip.registers().v[5], 0xC);
    assert_eq!(chip.set_key(0x10, true), Err(Error::InvalidKey(0x10)));
}

#[test]
fn recursion_overflows_stack() {
    let _ = env_logger::builder().is_test(true).try_init();

    let timers = Timers::new();
    let mut chip = Builder::new()
        .with_context(TestingContext::new())
        .with_timers(&timers)
        .with_program(&[0x22, 0x00])
        .build()
        .unwrap();

    for _ in 0..16 {
        chip.step().unwrap();
    }
    let regs = chip.registers().clone();
    assert_eq!(chip.step(), Err(nb::Error::Other(Error::StackOverflow)));
    assert_eq!(chip.registers(), &regs);
}

#[test]
fn random_is_masked() {
    let _ = env_logger::builder().is_test(true).try_init();

    let timers = Timers::new();
    let mut chip = Builder::new()
        .with_context(TestingContext::new())
        .with_timers(&timers)
        .with_program(&[0xC0, 0x0F, 0x12, 0x00])
        .build()
        .unwrap();

    for _ in 0..64 {
        chip.step().unwrap();
        assert!(chip.registers().v[0] <= 0x0F);
        chip.step().unwrap();
    }
}

#[test]
fn reset_and_reload() {
    let _ = env_logger::builder().is_test(true).try_init();

    let timers = Timers::new();
    let mut chip = Builder::new()
        .with_context(TestingContext::new())
        .with_timers(&timers)
        .with_program(&[0x61, 0x01, 0xF1, 0x15])
        .build()
        .unwrap();
    chip.step().unwrap();
    chip.step().unwrap();
    assert_eq!(timers.delay(), 1);

    chip.reset();
    assert_eq!(timers.delay(), 0);
    assert_eq!(chip.memory().read_word(0x200), Ok(0));

    chip.load_program(&[0x62, 0x02]).unwrap();
    chip.step().unwrap();
    assert_eq!(chip.registers().v[1..3], [0u8, 2]);
}
