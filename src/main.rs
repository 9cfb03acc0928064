use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind},
    execute, terminal,
};
use std::io::{self, stdout};
use std::time::{Duration, Instant};

mod game;
mod render;

use game::{EXIT_BUTTON, Game, MouseState, RESTART_BUTTON};
use render::PixelBuf;

const FRAME: Duration = Duration::from_micros(16_667); // 60 fps

fn main() -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        event::EnableMouseCapture,
    )?;

    let result = run(&mut out);

    // Teardown runs on every exit path, including errors from the loop.
    execute!(
        out,
        event::DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()?;
    result
}

fn run(out: &mut io::Stdout) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut buf = PixelBuf::new(cols as usize, rows as usize * 2);
    let mut game = Game::new();
    let mut rng = rand::thread_rng();
    let mut mouse = MouseState::default();

    loop {
        let frame_start = Instant::now();

        // Drain every pending event before any logic runs.
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => game.flap(),
                    _ => {}
                },
                Event::Mouse(m) => {
                    mouse.pos = buf.cell_to_world(m.column, m.row);
                    match m.kind {
                        MouseEventKind::Down(MouseButton::Left) => {
                            mouse.left_held = true;
                            if EXIT_BUTTON.contains(mouse.pos) {
                                return Ok(());
                            }
                        }
                        MouseEventKind::Up(MouseButton::Left) => mouse.left_held = false,
                        _ => {}
                    }
                }
                Event::Resize(c, r) => buf.resize(c as usize, r as usize * 2),
                _ => {}
            }
        }

        // Holding the left button over the restart button restarts.
        if game.game_over && mouse.left_held && RESTART_BUTTON.contains(mouse.pos) {
            game.restart();
        }

        game.update(&mut rng);

        render::draw(&game, &mouse, &mut buf);
        buf.present(out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}
