use rand::Rng;

// ── World constants ─────────────────────────────────────────────────────────
//
// The simulation runs in a fixed 800x600 logical space (y grows downward);
// the renderer scales it to whatever the terminal happens to be.

pub const SCREEN_W: f64 = 800.0;
pub const SCREEN_H: f64 = 600.0;

pub const BIRD_W: f64 = 40.0;
pub const BIRD_H: f64 = 30.0;
const BIRD_SPAWN_X: f64 = 266.0; // SCREEN_W / 3, truncated
const BIRD_SPAWN_Y: f64 = 300.0;
const GRAVITY: f64 = 0.25;
const FLAP_STRENGTH: f64 = 6.0;

pub const PIPE_W: f64 = 70.0;
const PIPE_SPEED: f64 = 3.0;
const PIPE_PAIR_OFFSET: f64 = 150.0;
const INITIAL_PIPE_GAP: f64 = 140.0;
const INITIAL_PIPE_FREQUENCY: f64 = 1000.0;

pub const COIN_SIZE: f64 = 20.0;
const COIN_SPEED: f64 = 3.0;
const COIN_FREQUENCY: u32 = 300;

const RAMP_INTERVAL: u32 = 5;
const RAMP_STEP: f64 = 10.0;

pub const RESTART_BUTTON: Rect = Rect {
    x: 150.0,
    y: 250.0,
    w: 100.0,
    h: 50.0,
};
pub const EXIT_BUTTON: Rect = Rect {
    x: 700.0,
    y: 10.0,
    w: 90.0,
    h: 30.0,
};

// ── Geometry ────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in logical screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn contains(&self, (px, py): (f64, f64)) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

/// Mouse state tracked from the event stream. The terminal backend has no
/// instantaneous query, so the loop folds move/press events into this.
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseState {
    pub pos: (f64, f64),
    pub left_held: bool,
}

// ── Entities ────────────────────────────────────────────────────────────────

/// The player. `x` never changes after spawn; only `y` and `velocity` do.
#[derive(Debug, Clone, Copy)]
pub struct Bird {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
}

impl Bird {
    fn new() -> Self {
        Bird {
            x: BIRD_SPAWN_X,
            y: BIRD_SPAWN_Y,
            velocity: 0.0,
        }
    }

    /// Velocity override, not an additive impulse.
    fn flap(&mut self) {
        self.velocity = -FLAP_STRENGTH;
    }

    fn update(&mut self) {
        self.velocity += GRAVITY;
        self.y += self.velocity;
    }
}

/// One pipe column. `height` is the gap center; the gap size itself is read
/// live from [`Difficulty`] at every evaluation, so an already-spawned pipe
/// tightens when the ramp kicks in.
#[derive(Debug, Clone)]
pub struct Pipe {
    pub x: f64,
    pub height: f64,
    pub passed: bool,
}

impl Pipe {
    fn spawn(x: f64, rng: &mut impl Rng) -> Self {
        Pipe {
            x,
            height: rng.gen_range(100..=400) as f64,
            passed: false,
        }
    }

    fn off_screen(&self) -> bool {
        self.x < -PIPE_W
    }
}

#[derive(Debug, Clone)]
pub struct Coin {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

/// Strict both-sides corner test: only the bird's bottom-right corner
/// counts, so grazing overlaps along the other edges never collect.
fn coin_caught(bird: &Bird, coin: &Coin) -> bool {
    let corner_x = bird.x + BIRD_W;
    let corner_y = bird.y + BIRD_H;
    coin.x < corner_x
        && corner_x < coin.x + COIN_SIZE
        && coin.y < corner_y
        && corner_y < coin.y + COIN_SIZE
}

// ── Difficulty ──────────────────────────────────────────────────────────────

/// The two session tunables the ramp tightens. Both only ever decrease while
/// a session runs and snap back to the initial constants on restart. Neither
/// has a floor: `pipe_frequency` below zero makes the spawn gate pass every
/// frame, which is kept as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    pub pipe_gap: f64,
    pub pipe_frequency: f64,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty {
            pipe_gap: INITIAL_PIPE_GAP,
            pipe_frequency: INITIAL_PIPE_FREQUENCY,
        }
    }
}

// ── Game state ──────────────────────────────────────────────────────────────

pub struct Game {
    pub bird: Bird,
    pub pipes: Vec<Pipe>,
    pub coins: Vec<Coin>,
    pub score: u32,
    /// Best score of any session this process, never decreases.
    pub high_score: u32,
    pub game_over: bool,
    /// Counts spawn events (pipe pairs), drives the difficulty ramp.
    pipes_spawned: u32,
    pub difficulty: Difficulty,
    /// Frame counter for render animation (wing beat, hill scroll).
    pub frame: u64,
}

impl Game {
    pub fn new() -> Self {
        Game {
            bird: Bird::new(),
            pipes: Vec::new(),
            coins: Vec::new(),
            score: 0,
            high_score: 0,
            game_over: false,
            pipes_spawned: 0,
            difficulty: Difficulty::default(),
            frame: 0,
        }
    }

    /// Flap key: flaps while playing, restarts once the session is over.
    pub fn flap(&mut self) {
        if self.game_over {
            self.restart();
        } else {
            self.bird.flap();
        }
    }

    /// Fresh session. Only the high score and frame counter survive.
    pub fn restart(&mut self) {
        self.bird = Bird::new();
        self.pipes.clear();
        self.coins.clear();
        self.score = 0;
        self.game_over = false;
        self.pipes_spawned = 0;
        self.difficulty = Difficulty::default();
    }

    /// One logical frame. Frozen entirely while game over.
    pub fn update(&mut self, rng: &mut impl Rng) {
        self.frame += 1;
        if self.game_over {
            return;
        }

        self.bird.update();

        // Spawn a pipe pair once the newest pipe has scrolled far enough.
        let pair_due = self
            .pipes
            .last()
            .is_none_or(|p| p.x < SCREEN_W - self.difficulty.pipe_frequency);
        if pair_due {
            self.pipes.push(Pipe::spawn(SCREEN_W, rng));
            self.pipes
                .push(Pipe::spawn(SCREEN_W + PIPE_W + PIPE_PAIR_OFFSET, rng));
            self.pipes_spawned += 1;
            if self.pipes_spawned % RAMP_INTERVAL == 0 {
                self.difficulty.pipe_gap -= RAMP_STEP;
            }
        }

        // Coin lottery.
        if rng.gen_range(0..=COIN_FREQUENCY) == 0 {
            let y = rng.gen_range(50..=(SCREEN_H - 50.0 - COIN_SIZE) as i32) as f64;
            self.coins.push(Coin {
                x: SCREEN_W,
                y,
                visible: true,
            });
        }

        // Scroll pipes, then compact the culled ones in one pass.
        for pipe in &mut self.pipes {
            pipe.x -= PIPE_SPEED;
        }
        self.pipes.retain(|p| !p.off_screen());

        // Pass scoring, deduplicated by the `passed` flag. While the spawn
        // count sits on a ramp multiple, every pass also tightens spacing.
        let bird_x = self.bird.x;
        for pipe in &mut self.pipes {
            if !pipe.passed && pipe.x + PIPE_W < bird_x {
                pipe.passed = true;
                self.score += 1;
                if self.pipes_spawned % RAMP_INTERVAL == 0 {
                    self.difficulty.pipe_frequency -= RAMP_STEP;
                }
            }
        }

        if self.fatal_collision() {
            self.high_score = self.high_score.max(self.score);
            self.game_over = true;
            return;
        }

        // Scroll coins; off-screen coins go invisible but stay in the list.
        for coin in &mut self.coins {
            coin.x -= COIN_SPEED;
            if coin.x < -COIN_SIZE {
                coin.visible = false;
            }
        }

        // Collection is the only removal path for coins.
        let bird = self.bird;
        let mut collected = 0u32;
        self.coins.retain(|coin| {
            if coin_caught(&bird, coin) {
                collected += 1;
                false
            } else {
                true
            }
        });
        self.score += 2 * collected;
    }

    /// Bounds first (independent of any pipe), then pipe overlap against the
    /// live gap value.
    fn fatal_collision(&self) -> bool {
        let bird = &self.bird;
        if bird.y < 0.0 || bird.y > SCREEN_H {
            return true;
        }

        let half_gap = self.difficulty.pipe_gap / 2.0;
        self.pipes.iter().any(|pipe| {
            bird.x + BIRD_W > pipe.x
                && bird.x < pipe.x + PIPE_W
                && (bird.y < pipe.height - half_gap || bird.y + BIRD_H > pipe.height + half_gap)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn pipe(x: f64, height: f64) -> Pipe {
        Pipe {
            x,
            height,
            passed: false,
        }
    }

    #[test]
    fn gravity_integration_sequence() {
        // 4 frames of free fall from y=300: v = .25,.5,.75,1.0 and
        // y = 300.25, 300.75, 301.5, 302.5
        let mut bird = Bird::new();
        let expected = [
            (0.25, 300.25),
            (0.5, 300.75),
            (0.75, 301.5),
            (1.0, 302.5),
        ];
        for (v, y) in expected {
            bird.update();
            assert!((bird.velocity - v).abs() < 1e-9);
            assert!((bird.y - y).abs() < 1e-9);
        }
    }

    #[test]
    fn flap_overrides_velocity() {
        let mut bird = Bird::new();
        bird.velocity = 12.0; // plummeting
        bird.flap();
        assert_eq!(bird.velocity, -FLAP_STRENGTH);
        // Not additive: flapping twice gives the same result.
        bird.flap();
        assert_eq!(bird.velocity, -FLAP_STRENGTH);
    }

    #[test]
    fn bird_x_constant_through_session() {
        let mut game = Game::new();
        let x0 = game.bird.x;
        let mut rng = rng();
        for _ in 0..30 {
            game.flap();
            game.update(&mut rng);
        }
        assert_eq!(game.bird.x, x0);
    }

    #[test]
    fn first_update_spawns_a_pair() {
        let mut game = Game::new();
        game.update(&mut rng());
        assert_eq!(game.pipes.len(), 2);
        // One at the right edge, one offset by pipe width + 150, both already
        // moved one speed step.
        assert_eq!(game.pipes[0].x, SCREEN_W - PIPE_SPEED);
        assert_eq!(game.pipes[1].x, SCREEN_W + PIPE_W + PIPE_PAIR_OFFSET - PIPE_SPEED);
        for p in &game.pipes {
            assert!((100.0..=400.0).contains(&p.height));
            assert!(!p.passed);
        }
    }

    #[test]
    fn gap_tightens_every_fifth_spawn() {
        let mut game = Game::new();
        let mut rng = rng();
        for i in 1..=10u32 {
            // Force a spawn event each iteration and keep the bird alive.
            game.pipes.clear();
            game.bird.y = BIRD_SPAWN_Y;
            game.bird.velocity = 0.0;
            game.update(&mut rng);
            let expected = INITIAL_PIPE_GAP - RAMP_STEP * (i / RAMP_INTERVAL) as f64;
            assert_eq!(game.difficulty.pipe_gap, expected);
        }
        assert_eq!(game.difficulty.pipe_gap, INITIAL_PIPE_GAP - 2.0 * RAMP_STEP);
    }

    #[test]
    fn frequency_tightens_on_pass_at_ramp_multiple() {
        let mut game = Game::new();
        game.pipes_spawned = RAMP_INTERVAL;
        // Pipe whose trailing edge crosses the bird this frame.
        game.pipes.push(pipe(game.bird.x - PIPE_W - 2.0, 300.0));
        game.update(&mut rng());
        assert_eq!(game.score, 1);
        assert_eq!(
            game.difficulty.pipe_frequency,
            INITIAL_PIPE_FREQUENCY - RAMP_STEP
        );
    }

    #[test]
    fn pass_scored_exactly_once() {
        let mut game = Game::new();
        game.pipes.push(pipe(game.bird.x - PIPE_W - 2.0, 300.0));
        let mut rng = rng();
        game.update(&mut rng);
        assert_eq!(game.score, 1);
        assert!(game.pipes[0].passed);
        // Checked again frames later: the flag blocks a double count.
        game.bird.y = BIRD_SPAWN_Y;
        game.bird.velocity = 0.0;
        game.update(&mut rng);
        assert_eq!(game.score, 1);
    }

    #[test]
    fn pipe_culled_past_left_edge() {
        let mut game = Game::new();
        game.pipes.push(pipe(-PIPE_W + 2.0, 300.0));
        game.update(&mut rng());
        // -68 - 3 = -71 < -70: gone the same frame.
        assert!(game.pipes.iter().all(|p| p.x >= -PIPE_W));
        assert!(!game.pipes.iter().any(|p| p.x < -PIPE_W));
    }

    #[test]
    fn out_of_bounds_is_fatal_without_pipes() {
        let mut game = Game::new();
        game.score = 7;
        game.bird.y = -1.0;
        game.bird.velocity = -FLAP_STRENGTH;
        game.update(&mut rng());
        assert!(game.game_over);
        assert_eq!(game.high_score, 7);

        let mut game = Game::new();
        game.bird.y = SCREEN_H + 1.0;
        game.update(&mut rng());
        assert!(game.game_over);
    }

    #[test]
    fn pipe_overlap_outside_gap_is_fatal() {
        let mut game = Game::new();
        // Pipe over the bird, gap centered well below it.
        game.pipes.push(pipe(game.bird.x, 400.0));
        game.bird.y = 100.0;
        assert!(game.fatal_collision());

        // Inside the gap: safe.
        game.bird.y = 400.0 - BIRD_H / 2.0;
        assert!(!game.fatal_collision());
    }

    #[test]
    fn gap_narrowing_applies_to_spawned_pipes() {
        // The collision check reads the live gap, so the ramp retroactively
        // tightens pipes already on screen.
        let mut game = Game::new();
        game.pipes.push(pipe(game.bird.x, 300.0));
        game.bird.y = 235.0; // above center but inside the initial 140 gap
        assert!(!game.fatal_collision());
        game.difficulty.pipe_gap = 20.0;
        assert!(game.fatal_collision());
    }

    #[test]
    fn negative_frequency_spawns_every_frame() {
        let mut game = Game::new();
        game.difficulty.pipe_frequency = -500.0;
        let mut rng = rng();
        game.update(&mut rng);
        let after_one = game.pipes.len();
        assert_eq!(after_one, 2);
        game.bird.y = BIRD_SPAWN_Y;
        game.bird.velocity = 0.0;
        game.update(&mut rng);
        assert_eq!(game.pipes.len(), after_one + 2);
    }

    #[test]
    fn coin_collection_pays_two_and_removes() {
        let mut game = Game::new();
        // Corner (306, 330) strictly inside both spans after one scroll step:
        // coin moves to x=290 this frame.
        game.coins.push(Coin {
            x: 293.0,
            y: 315.0,
            visible: true,
        });
        game.update(&mut rng());
        assert_eq!(game.score, 2);
        // Gone immediately; anything left can only be a fresh lottery spawn
        // still far off to the right.
        assert!(game.coins.iter().all(|c| c.x >= 700.0));
    }

    #[test]
    fn coin_corner_test_is_strict() {
        // Bird at (85,85) 40x30, coin at (100,100) size 20: the corner
        // (125,115) fails the strict x check (125 < 120 is false), so the
        // coin is NOT collected even though the rectangles overlap.
        let bird = Bird {
            x: 85.0,
            y: 85.0,
            velocity: 0.0,
        };
        let coin = Coin {
            x: 100.0,
            y: 100.0,
            visible: true,
        };
        assert!(!coin_caught(&bird, &coin));

        // Corner strictly inside both spans: collected.
        let coin = Coin {
            x: 110.0,
            y: 100.0,
            visible: true,
        };
        assert!(coin_caught(&bird, &coin));
    }

    #[test]
    fn offscreen_coin_hidden_but_kept() {
        let mut game = Game::new();
        game.coins.push(Coin {
            x: -COIN_SIZE + 1.0,
            y: 300.0,
            visible: true,
        });
        game.update(&mut rng());
        assert!(
            game.coins
                .iter()
                .any(|c| c.x < -COIN_SIZE && !c.visible)
        );
    }

    #[test]
    fn restart_resets_session_keeps_high_score() {
        let mut game = Game::new();
        let mut rng = rng();
        game.score = 9;
        game.difficulty.pipe_gap = 90.0;
        game.difficulty.pipe_frequency = 940.0;
        game.pipes_spawned = 13;
        game.coins.push(Coin {
            x: 400.0,
            y: 300.0,
            visible: true,
        });
        game.bird.y = SCREEN_H + 5.0;
        game.update(&mut rng);
        assert!(game.game_over);
        assert_eq!(game.high_score, 9);

        // Flap while game over restarts.
        game.flap();
        assert!(!game.game_over);
        assert_eq!(game.score, 0);
        assert!(game.pipes.is_empty());
        assert!(game.coins.is_empty());
        assert_eq!(game.difficulty, Difficulty::default());
        assert_eq!(game.pipes_spawned, 0);
        assert_eq!(game.bird.y, BIRD_SPAWN_Y);
        assert_eq!(game.bird.velocity, 0.0);
        assert_eq!(game.high_score, 9);
    }

    #[test]
    fn high_score_non_decreasing_across_restarts() {
        let mut game = Game::new();
        let mut rng = rng();
        for (round_score, expected_high) in [(4u32, 4u32), (2, 4), (6, 6)] {
            game.score = round_score;
            game.bird.y = SCREEN_H + 1.0;
            game.update(&mut rng);
            assert!(game.game_over);
            assert_eq!(game.high_score, expected_high);
            game.restart();
        }
    }

    #[test]
    fn frozen_while_game_over() {
        let mut game = Game::new();
        game.game_over = true;
        game.pipes.push(pipe(500.0, 300.0));
        let y = game.bird.y;
        game.update(&mut rng());
        assert_eq!(game.bird.y, y);
        assert_eq!(game.pipes[0].x, 500.0);
    }

    #[test]
    fn restart_button_hit_test() {
        assert!(RESTART_BUTTON.contains((200.0, 275.0)));
        assert!(!RESTART_BUTTON.contains((149.0, 275.0)));
        assert!(EXIT_BUTTON.contains((745.0, 25.0)));
        assert!(!EXIT_BUTTON.contains((745.0, 45.0)));
    }
}
