use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chess_rules::{Error, Game, Piece, Square};
use clap::Parser;
use log::warn;

const HELP: &str = "\
commands:
  show               print the board
  moves <square>     list where the piece on <square> may go
  move <from> <to>   play a move, e.g. `move e2 e4`
  new                start a new game
  quit";

/// Play both sides of a chess game from the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Draw pieces as chess glyphs instead of letters
    #[arg(long)]
    unicode: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut driver = Driver {
        game: Game::new(),
        unicode: args.unicode,
    };
    driver.run()
}

struct Driver {
    game: Game,
    unicode: bool,
}

impl Driver {
    fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        self.show(&mut stdout)?;
        for line in stdin.lock().lines() {
            let line = line.context("failed to read from stdin")?;
            let parts: Vec<&str> = line.split_whitespace().collect();

            match parts.as_slice() {
                [] => {}
                ["quit"] => break,
                ["help"] => writeln!(stdout, "{HELP}")?,
                ["show"] => self.show(&mut stdout)?,
                ["new"] => {
                    self.game = Game::new();
                    self.show(&mut stdout)?;
                }
                ["moves", square] => self.moves(&mut stdout, square)?,
                ["move", from, to] => self.play(&mut stdout, from, to)?,
                _ => {
                    warn!("unknown command: {line:?}");
                    writeln!(stdout, "unknown command, try `help`")?;
                }
            }
            stdout.flush()?;
        }
        Ok(())
    }

    fn show(&mut self, out: &mut impl Write) -> Result<()> {
        let glyph: fn(&Piece) -> char = if self.unicode {
            Piece::symbol
        } else {
            Piece::letter
        };
        write!(out, "{}", self.game.board().render(glyph))?;
        writeln!(out, "{}", self.game.status()?)?;
        Ok(())
    }

    fn moves(&mut self, out: &mut impl Write, square: &str) -> Result<()> {
        let selection = match square.parse::<Square>().and_then(|s| self.game.select(s)) {
            Ok(selection) => selection,
            Err(err) => return report(out, err),
        };
        self.game.deselect();

        if selection.is_empty() {
            writeln!(out, "{} has no legal moves", selection.from)?;
            return Ok(());
        }
        writeln!(out, "moves: {}", join(&selection.quiet))?;
        writeln!(out, "captures: {}", join(&selection.captures))?;
        Ok(())
    }

    fn play(&mut self, out: &mut impl Write, from: &str, to: &str) -> Result<()> {
        let squares = from
            .parse::<Square>()
            .and_then(|from| Ok((from, to.parse::<Square>()?)));
        match squares.and_then(|(from, to)| self.game.play(from, to)) {
            Ok(_) => self.show(out),
            Err(err) => report(out, err),
        }
    }
}

/// Prints a rejected request. A missing king means the engine itself is
/// broken, so that one is fatal.
fn report(out: &mut impl Write, err: Error) -> Result<()> {
    if let Error::MissingKing(_) = err {
        return Err(err).context("board is missing a king");
    }
    warn!("{err}");
    writeln!(out, "{err}")?;
    Ok(())
}

fn join(squares: &[Square]) -> String {
    if squares.is_empty() {
        return "-".to_string();
    }
    squares
        .iter()
        .map(Square::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
