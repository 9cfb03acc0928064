use crossterm::{
    cursor, queue,
    style::{self, Color},
};
use std::io::{self, Write};

use crate::game::{
    BIRD_H, BIRD_W, COIN_SIZE, EXIT_BUTTON, Game, MouseState, PIPE_W, RESTART_BUTTON, Rect,
    SCREEN_H, SCREEN_W,
};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t) as u8;
        Rgb(ch(self.0, other.0), ch(self.1, other.1), ch(self.2, other.2))
    }

    fn dimmed(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }

    fn term(self) -> Color {
        Color::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

const SKY_TOP: Rgb = Rgb(72, 178, 202);
const SKY_BOT: Rgb = Rgb(188, 230, 244);
const HILL_FAR: Rgb = Rgb(122, 196, 78);
const HILL_NEAR: Rgb = Rgb(96, 176, 58);
const PIPE_DARK: Rgb = Rgb(62, 112, 24);
const PIPE_BODY: Rgb = Rgb(96, 168, 38);
const PIPE_LIGHT: Rgb = Rgb(140, 212, 60);
const PIPE_CAP: Rgb = Rgb(52, 92, 18);
const BIRD_BODY: Rgb = Rgb(246, 202, 64);
const BIRD_WING: Rgb = Rgb(214, 164, 34);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(18, 18, 18);
const BIRD_BEAK: Rgb = Rgb(228, 80, 36);
const COIN_GOLD: Rgb = Rgb(252, 208, 40);
const COIN_RIM: Rgb = Rgb(190, 148, 16);
const COIN_SHINE: Rgb = Rgb(255, 244, 170);
const BUTTON_BG: Rgb = Rgb(16, 16, 16);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(28, 28, 28);

// ── Pixel buffer, two pixels per terminal row ───────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize,
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        PixelBuf {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn at(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    /// Map a terminal cell (mouse event coordinates) into logical space.
    pub fn cell_to_world(&self, col: u16, row: u16) -> (f64, f64) {
        let wx = (col as f64 + 0.5) * SCREEN_W / self.w.max(1) as f64;
        let wy = (row as f64 * 2.0 + 1.0) * SCREEN_H / self.h.max(1) as f64;
        (wx, wy)
    }

    /// Emit the buffer as half-block characters, pairing pixel rows into one
    /// terminal row. Colors are only re-queued when they change.
    pub fn present(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let mut fg: Option<Rgb> = None;
        let mut bg: Option<Rgb> = None;

        for row in 0..self.h / 2 {
            for col in 0..self.w {
                let top = self.at(col, row * 2);
                let bot = self.at(col, row * 2 + 1);

                if top == bot {
                    if bg != Some(top) {
                        queue!(out, style::SetBackgroundColor(top.term()))?;
                        bg = Some(top);
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if fg != Some(top) {
                        queue!(out, style::SetForegroundColor(top.term()))?;
                        fg = Some(top);
                    }
                    if bg != Some(bot) {
                        queue!(out, style::SetBackgroundColor(bot.term()))?;
                        bg = Some(bot);
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < self.h / 2 {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                fg = None;
                bg = None;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

// ── 3x5 bitmap font (digits plus the letters the HUD needs) ─────────────────

#[rustfmt::skip]
fn glyph(c: char) -> Option<[u8; 15]> {
    Some(match c {
        '0' => [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1],
        '1' => [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1],
        '2' => [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1],
        '3' => [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1],
        '4' => [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1],
        '5' => [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1],
        '6' => [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1],
        '7' => [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0],
        '8' => [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1],
        '9' => [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1],
        'A' => [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,0,1],
        'B' => [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,1,0],
        'C' => [1,1,1, 1,0,0, 1,0,0, 1,0,0, 1,1,1],
        'E' => [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,1,1],
        'G' => [1,1,1, 1,0,0, 1,0,1, 1,0,1, 1,1,1],
        'I' => [1,1,1, 0,1,0, 0,1,0, 0,1,0, 1,1,1],
        'M' => [1,0,1, 1,1,1, 1,0,1, 1,0,1, 1,0,1],
        'O' => [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1],
        'R' => [1,1,1, 1,0,1, 1,1,0, 1,0,1, 1,0,1],
        'S' => [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1],
        'T' => [1,1,1, 0,1,0, 0,1,0, 0,1,0, 0,1,0],
        'V' => [1,0,1, 1,0,1, 1,0,1, 1,0,1, 0,1,0],
        'X' => [1,0,1, 1,0,1, 0,1,0, 1,0,1, 1,0,1],
        _ => return None,
    })
}

fn text_width(s: &str) -> i32 {
    s.len() as i32 * 4 - 1
}

fn draw_text(buf: &mut PixelBuf, x: i32, y: i32, s: &str, fg: Rgb) {
    for (i, c) in s.chars().enumerate() {
        let Some(g) = glyph(c) else { continue };
        let gx = x + i as i32 * 4;
        for row in 0..5 {
            for col in 0..3 {
                if g[row * 3 + col] == 1 {
                    buf.set(gx + col as i32 + 1, y + row as i32 + 1, SHADOW);
                    buf.set(gx + col as i32, y + row as i32, fg);
                }
            }
        }
    }
}

// ── Scene ───────────────────────────────────────────────────────────────────

/// Logical-to-pixel scaling for the current buffer size.
struct View {
    sx: f64,
    sy: f64,
}

impl View {
    fn of(buf: &PixelBuf) -> Self {
        View {
            sx: buf.w as f64 / SCREEN_W,
            sy: buf.h as f64 / SCREEN_H,
        }
    }

    fn x(&self, wx: f64) -> i32 {
        (wx * self.sx).round() as i32
    }

    fn y(&self, wy: f64) -> i32 {
        (wy * self.sy).round() as i32
    }

    /// Fill a logical rect, snapping both edges so adjacent rects stay flush.
    fn fill(&self, buf: &mut PixelBuf, x: f64, y: f64, w: f64, h: f64, c: Rgb) {
        let x0 = self.x(x);
        let y0 = self.y(y);
        buf.fill(x0, y0, self.x(x + w) - x0, self.y(y + h) - y0, c);
    }

    fn outline(&self, buf: &mut PixelBuf, r: Rect, c: Rgb) {
        let (x0, y0) = (self.x(r.x), self.y(r.y));
        let (x1, y1) = (self.x(r.x + r.w), self.y(r.y + r.h));
        buf.fill(x0, y0, x1 - x0, 1, c);
        buf.fill(x0, y1 - 1, x1 - x0, 1, c);
        buf.fill(x0, y0, 1, y1 - y0, c);
        buf.fill(x1 - 1, y0, 1, y1 - y0, c);
    }
}

pub fn draw(game: &Game, mouse: &MouseState, buf: &mut PixelBuf) {
    let view = View::of(buf);

    draw_sky(buf);
    draw_hills(game, buf);
    draw_pipes(game, &view, buf);
    draw_coins(game, &view, buf);
    draw_bird(game, &view, buf);
    draw_hud(game, buf);

    if game.game_over {
        draw_game_over(game, mouse, &view, buf);
    }
    draw_button(&view, buf, EXIT_BUTTON, "EXIT", EXIT_BUTTON.contains(mouse.pos));
}

fn draw_sky(buf: &mut PixelBuf) {
    for y in 0..buf.h {
        let c = SKY_TOP.mix(SKY_BOT, y as f64 / buf.h.max(1) as f64);
        for x in 0..buf.w {
            buf.set(x as i32, y as i32, c);
        }
    }
}

/// Two parallax sine ridges along the bottom edge. Decorative only.
fn draw_hills(game: &Game, buf: &mut PixelBuf) {
    let base = buf.h as i32;
    let scroll = game.frame as f64;
    for (color, drift, freq, amp, lift) in [
        (HILL_FAR, 0.2, 0.045, 5.0, 7.0),
        (HILL_NEAR, 0.4, 0.065, 3.5, 3.0),
    ] {
        for x in 0..buf.w as i32 {
            let fx = (x as f64 + scroll * drift) * freq;
            let h = (fx.sin() * amp + (fx * 1.9).sin() * amp * 0.5 + lift).max(0.0);
            for y in (base - h as i32)..base {
                buf.set(x, y, color);
            }
        }
    }
}

fn pipe_shade(col: i32, w: i32) -> Rgb {
    let t = col as f64 / (w - 1).max(1) as f64;
    if t < 0.18 || t > 0.88 {
        PIPE_DARK
    } else if (0.4..0.62).contains(&t) {
        PIPE_LIGHT
    } else {
        PIPE_BODY
    }
}

fn draw_pipes(game: &Game, view: &View, buf: &mut PixelBuf) {
    let half_gap = game.difficulty.pipe_gap / 2.0;
    let cap_h = 10.0; // logical units

    for pipe in &game.pipes {
        let gap_top = pipe.height - half_gap;
        let gap_bot = pipe.height + half_gap;
        let x0 = view.x(pipe.x);
        let x1 = view.x(pipe.x + PIPE_W);

        for px in x0..x1 {
            let c = pipe_shade(px - x0, x1 - x0);
            // Top column down to the gap, bottom column from the gap down.
            buf.fill(px, 0, 1, view.y(gap_top), c);
            let by = view.y(gap_bot);
            buf.fill(px, by, 1, buf.h as i32 - by, c);
        }
        // Cap bands bordering the gap.
        view.fill(buf, pipe.x, gap_top - cap_h, PIPE_W, cap_h, PIPE_CAP);
        view.fill(buf, pipe.x, gap_bot, PIPE_W, cap_h, PIPE_CAP);
    }
}

fn draw_coins(game: &Game, view: &View, buf: &mut PixelBuf) {
    for coin in game.coins.iter().filter(|c| c.visible) {
        view.fill(buf, coin.x, coin.y, COIN_SIZE, COIN_SIZE, COIN_RIM);
        let inset = COIN_SIZE * 0.15;
        view.fill(
            buf,
            coin.x + inset,
            coin.y + inset,
            COIN_SIZE - 2.0 * inset,
            COIN_SIZE - 2.0 * inset,
            COIN_GOLD,
        );
        buf.set(
            view.x(coin.x + COIN_SIZE * 0.3),
            view.y(coin.y + COIN_SIZE * 0.3),
            COIN_SHINE,
        );
    }
}

fn draw_bird(game: &Game, view: &View, buf: &mut PixelBuf) {
    let b = &game.bird;
    view.fill(buf, b.x, b.y, BIRD_W, BIRD_H, BIRD_BODY);

    // Wing beats on an 8-frame cycle.
    let wing_y = if game.frame % 8 < 4 {
        b.y + BIRD_H * 0.25
    } else {
        b.y + BIRD_H * 0.45
    };
    view.fill(buf, b.x + BIRD_W * 0.1, wing_y, BIRD_W * 0.4, BIRD_H * 0.3, BIRD_WING);

    // Eye near the leading edge.
    view.fill(
        buf,
        b.x + BIRD_W * 0.62,
        b.y + BIRD_H * 0.15,
        BIRD_W * 0.18,
        BIRD_H * 0.28,
        BIRD_EYE,
    );
    buf.set(
        view.x(b.x + BIRD_W * 0.74),
        view.y(b.y + BIRD_H * 0.3),
        BIRD_PUPIL,
    );

    // Beak pokes past the body.
    view.fill(
        buf,
        b.x + BIRD_W * 0.9,
        b.y + BIRD_H * 0.45,
        BIRD_W * 0.25,
        BIRD_H * 0.2,
        BIRD_BEAK,
    );
}

fn draw_hud(game: &Game, buf: &mut PixelBuf) {
    draw_text(buf, 2, 2, &format!("SCORE {}", game.score), WHITE);
    draw_text(buf, 2, 9, &format!("BEST {}", game.high_score), BIRD_BODY);
}

fn draw_game_over(game: &Game, mouse: &MouseState, view: &View, buf: &mut PixelBuf) {
    for y in 0..buf.h {
        for x in 0..buf.w {
            let c = buf.at(x, y).dimmed();
            buf.set(x as i32, y as i32, c);
        }
    }

    let caption = "GAME OVER";
    draw_text(
        buf,
        buf.w as i32 / 2 - text_width(caption) / 2,
        view.y(170.0),
        caption,
        WHITE,
    );
    draw_text(
        buf,
        buf.w as i32 / 2 - text_width("SCORE 000") / 2,
        view.y(200.0),
        &format!("SCORE {}", game.score),
        COIN_GOLD,
    );

    let hovered = RESTART_BUTTON.contains(mouse.pos);
    draw_button(view, buf, RESTART_BUTTON, "RESTART", hovered);
}

fn draw_button(view: &View, buf: &mut PixelBuf, r: Rect, caption: &str, hovered: bool) {
    view.fill(buf, r.x, r.y, r.w, r.h, BUTTON_BG);
    let border = if hovered { COIN_GOLD } else { WHITE };
    view.outline(buf, r, border);

    let cx = view.x(r.x + r.w / 2.0);
    let cy = view.y(r.y + r.h / 2.0);
    draw_text(buf, cx - text_width(caption) / 2, cy - 2, caption, WHITE);
}
