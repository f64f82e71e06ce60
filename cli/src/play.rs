use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use super::*;
use crate::text_view::TextPresenter;
use gridjig_core::{decode_snapshot, encode_snapshot, Cell, Gesture, Hint, Presenter};

const HELP: &str = "commands: show | drag <row> <col> <row> <col> | hint | apply | save | quit";

pub(super) fn run(
    catalog: &LevelCatalog,
    level: usize,
    seed: Option<u32>,
    save: Option<PathBuf>,
    resume: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = match save.as_deref() {
        Some(path) if resume && path.exists() => load_session(catalog, path)?,
        _ => new_session(catalog, level, seed)?,
    };
    let mut presenter = TextPresenter::new(&session, true);
    let mut pending_hint = Hint::None;

    println!(
        "level {} ({}x{}), seed {:#010x}, {} moves so far",
        session.level(),
        session.grid().rows(),
        session.grid().cols(),
        session.seed(),
        session.moves()
    );
    println!("{HELP}");
    print!("{}", presenter.render());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["show"] => print!("{}", presenter.render()),
            ["drag", rest @ ..] => {
                let Some((from, to)) = parse_drag(rest) else {
                    println!("usage: drag <row> <col> <row> <col>");
                    continue;
                };
                let Some(piece) = session.occupancy().get(from) else {
                    println!("nothing at {from}");
                    continue;
                };
                if !session.grid().contains(to) {
                    println!("{to} is off the board");
                    continue;
                }
                let grid = session.grid();
                let start = grid.world_position(from);
                let end = grid.world_position(to);
                let report = session.handle_gesture(Gesture {
                    piece,
                    drag_delta: (end.0 - start.0, end.1 - start.1),
                    pointer_up: end,
                });
                if report.is_unchanged() {
                    println!("no move");
                    continue;
                }
                pending_hint = Hint::None;
                session.present(&report, &mut presenter);
                session.settle(&report, &mut presenter);
                print!("{}", presenter.render());
                if report.solved {
                    println!("solved in {} moves", session.moves());
                }
            }
            ["hint"] => {
                pending_hint = session.request_hint();
                presenter.show_hint(&pending_hint);
            }
            ["apply"] => {
                if pending_hint.is_none() {
                    pending_hint = session.request_hint();
                }
                let report = session.apply_hint(&pending_hint);
                pending_hint = Hint::None;
                if report.is_unchanged() {
                    println!("no move");
                    continue;
                }
                session.present(&report, &mut presenter);
                session.settle(&report, &mut presenter);
                print!("{}", presenter.render());
                if report.solved {
                    println!("solved in {} moves", session.moves());
                }
            }
            ["status"] => {
                let progress = session.progress();
                println!(
                    "{} moves, edges {}/{}, {} pieces home, {} groups",
                    session.moves(),
                    progress.connected,
                    progress.expected,
                    session.correct_count(),
                    session.groups().len()
                );
            }
            ["save"] => match save.as_deref() {
                Some(path) => {
                    save_session(&session, path)?;
                    println!("saved to {}", path.display());
                }
                None => println!("no save path (use --save or GRIDJIG_SAVE)"),
            },
            ["quit"] | ["exit"] => break,
            _ => println!("{HELP}"),
        }
    }

    Ok(())
}

fn parse_drag(args: &[&str]) -> Option<(Cell, Cell)> {
    let [r0, c0, r1, c1] = args else {
        return None;
    };
    let from = Cell::new(r0.parse().ok()?, c0.parse().ok()?);
    let to = Cell::new(r1.parse().ok()?, c1.parse().ok()?);
    Some((from, to))
}

fn load_session(
    catalog: &LevelCatalog,
    path: &Path,
) -> Result<Session, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)
        .map_err(|err| format!("failed to read save at {}: {err}", path.display()))?;
    let snapshot = decode_snapshot(&bytes)?;
    let session = Session::restore(catalog.rules, &snapshot)?;
    tracing::info!(path = %path.display(), moves = session.moves(), "play: resumed");
    Ok(session)
}

fn save_session(session: &Session, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = encode_snapshot(&session.snapshot())?;
    std::fs::write(path, bytes)
        .map_err(|err| format!("failed to write save at {}: {err}", path.display()))?;
    Ok(())
}
