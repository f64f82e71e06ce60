use gridjig_core::grid::{DIRECTIONS, opposite_dir};
use gridjig_core::{
    Cell, ConnectivityEngine, GridSpec, Hint, MovePolicy, MoveResolver, Occupancy, Piece,
    PieceId, Session, SessionRules,
};

/// Builds a board where `layout[i]` is the home index on cell `i`; pieces
/// are indexed by home index and must be `0..count`.
fn engine_board(
    rows: usize,
    cols: usize,
    layout: &[Option<usize>],
) -> (GridSpec, Vec<Piece>, Occupancy) {
    let grid = GridSpec::from_field(rows, cols, 300.0, 300.0, 0.0, (0.0, 0.0)).unwrap();
    let mut occupancy = Occupancy::new(&grid);
    let count = layout.iter().flatten().count();
    let mut pieces: Vec<Piece> = (0..count)
        .map(|home| Piece::new(home, cols, Cell::new(0, 0)))
        .collect();
    for (index, slot) in layout.iter().enumerate() {
        if let Some(home) = slot {
            let cell = grid.cell_at(index);
            pieces[*home].set_cell(cell);
            occupancy.place(cell, *home);
        }
    }
    ConnectivityEngine::new(&grid).recompute_all(&mut pieces, &occupancy);
    (grid, pieces, occupancy)
}

fn assert_consistent(pieces: &[Piece], occupancy: &Occupancy) {
    assert!(occupancy.is_injective());
    assert_eq!(occupancy.len(), pieces.len());
    for (id, piece) in pieces.iter().enumerate() {
        assert_eq!(occupancy.get(piece.cell()), Some(id));
    }
}

#[test]
fn first_misplaced_cell_proposes_swap_with_its_home_piece() {
    let session =
        Session::from_permutation(SessionRules::default(), 3, 3, &[4, 0, 7, 1, 8, 2, 5, 3, 6])
            .unwrap();
    let home_zero = session.piece(0).unwrap();
    assert_eq!(home_zero.cell(), Cell::new(0, 1));
    assert!(!home_zero.has_connections());
    assert_eq!(session.request_hint(), Hint::Swap { first: 4, second: 0 });
}

#[test]
fn connected_pair_keeps_its_offset() {
    // Row 0: [0, 1, 4]  Row 1: [2, _, _]  Row 2: [3, _, _]
    let layout = [
        Some(0), Some(1), Some(4),
        Some(2), None, None,
        Some(3), None, None,
    ];
    let (grid, pieces, occupancy) = engine_board(3, 3, &layout);
    let engine = ConnectivityEngine::new(&grid);
    let group: Vec<PieceId> = engine.connected_group(0, &pieces, &occupancy);
    assert_eq!(group, vec![0, 1]);

    for policy in [MovePolicy::Displace, MovePolicy::Strict] {
        let resolver = MoveResolver::new(&grid, policy);
        let plan = resolver.resolve(&group, &pieces, &occupancy, Cell::new(1, 1));
        assert_eq!(plan.destination(0), Some(Cell::new(1, 1)), "{policy:?}");
        assert_eq!(plan.destination(1), Some(Cell::new(1, 2)), "{policy:?}");
        assert_eq!(plan.placements.len(), 2, "{policy:?}");
    }
}

#[test]
fn occupant_relocates_to_the_only_empty_cell() {
    // Row 0: [3, 0, 6]  Row 1: [1, 7, 2]  Row 2: [5, 4, _]
    let layout = [
        Some(3), Some(0), Some(6),
        Some(1), Some(7), Some(2),
        Some(5), Some(4), None,
    ];
    for policy in [MovePolicy::Displace, MovePolicy::Strict] {
        let (grid, mut pieces, mut occupancy) = engine_board(3, 3, &layout);
        let engine = ConnectivityEngine::new(&grid);
        assert_eq!(engine.connected_group(3, &pieces, &occupancy), vec![3]);

        let resolver = MoveResolver::new(&grid, policy);
        let plan = resolver.resolve(&[3], &pieces, &occupancy, Cell::new(1, 1));
        assert_eq!(plan.destination(7), Some(Cell::new(2, 2)));
        assert_eq!(plan.destination(3), Some(Cell::new(1, 1)));
        assert_eq!(plan.placements.len(), 2);

        for placement in &plan.placements {
            occupancy.vacate(placement.from);
        }
        for placement in &plan.placements {
            assert!(occupancy.is_free(placement.to));
            occupancy.place(placement.to, placement.piece);
            pieces[placement.piece].set_cell(placement.to);
        }
        assert_consistent(&pieces, &occupancy);
        assert!(occupancy.is_free(Cell::new(0, 0)));
    }
}

#[test]
fn solved_board_is_one_group() {
    let perm: Vec<usize> = (0..16).collect();
    let session = Session::from_permutation(SessionRules::default(), 4, 4, &perm).unwrap();
    for id in 0..16 {
        assert_eq!(session.group_of(id), perm);
    }
    assert!(session.pieces().iter().all(Piece::is_correctly_placed));
    assert!(session.is_solved());
    assert_eq!(session.groups().len(), 1);
    assert_eq!(session.progress().connected, session.progress().expected);
}

#[test]
fn world_and_grid_positions_round_trip() {
    let grid = GridSpec::from_field(5, 7, 701.0, 433.0, 3.5, (-120.0, 40.0)).unwrap();
    for cell in grid.cells() {
        assert_eq!(grid.grid_position(grid.world_position(cell)), cell);
    }
}

#[test]
fn masks_are_symmetric_after_full_recompute() {
    let session = Session::new(SessionRules::default(), 0, 5, 5, 1234).unwrap();
    let grid = session.grid();
    for piece in session.pieces() {
        for dir in DIRECTIONS {
            let Some(next) = grid.neighbor(piece.cell(), dir) else {
                continue;
            };
            let other = session.piece_at(next).unwrap();
            assert_eq!(
                piece.is_connected(dir),
                other.is_connected(opposite_dir(dir)),
                "{} vs {}",
                piece.cell(),
                other.cell()
            );
        }
    }
}

#[test]
fn hints_drive_a_board_to_solved() {
    let mut session = Session::new(SessionRules::default(), 0, 4, 4, 77).unwrap();
    let mut applied = 0;
    while !session.is_solved() {
        let hint = session.request_hint();
        assert!(!hint.is_none());
        let report = session.apply_hint(&hint);
        assert!(!report.is_unchanged(), "hint {hint:?} did not move");
        applied += 1;
        assert!(applied <= 64, "hints are not converging");
    }
    assert_eq!(session.request_hint(), Hint::None);
}

#[test]
fn group_query_is_idempotent() {
    let session = Session::new(SessionRules::default(), 0, 4, 4, 5).unwrap();
    for id in 0..16 {
        assert_eq!(session.group_of(id), session.group_of(id));
        assert!(session.group_of(id).contains(&id));
    }
}
