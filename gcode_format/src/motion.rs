use common::{progress::Progress, Pos};
use tracing::trace;

/// A resolved absolute tool position and the material deposition reading at
/// one point in the travel sequence. Waypoint order is travel order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub position: Pos,
    pub deposition: f64,
}

/// Motion state carried from one linear move to the next. A move only
/// updates the axes it names, every other axis keeps its most recent value.
#[derive(Debug, Clone, Copy)]
pub struct MotionState {
    position: Pos,
    last_z: f64,
    last_deposition: f64,
}

impl MotionState {
    /// Starts at the origin with no material deposited.
    pub fn new() -> Self {
        Self {
            position: Pos::zeros(),
            last_z: 0.0,
            last_deposition: 0.0,
        }
    }

    /// Applies a single line to the state, returning the resulting waypoint
    /// for linear moves (first token `G1`) and `None` for everything else.
    ///
    /// Fields are single-letter prefixed decimals (`X`, `Y`, `Z`, `E`). A
    /// field that fails to parse counts as absent, it never fails the line.
    pub fn apply(&mut self, line: &str) -> Option<Waypoint> {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("G1") {
            return None;
        }

        let mut z_seen = false;
        let mut deposition = self.last_deposition;
        for token in tokens {
            let Some(value) = token.get(1..).and_then(|v| v.parse::<f64>().ok()) else {
                trace!("ignoring field {token:?}");
                continue;
            };

            match token.as_bytes()[0] {
                b'X' => self.position.x = value,
                b'Y' => self.position.y = value,
                b'Z' => {
                    self.position.z = value;
                    self.last_z = value;
                    z_seen = true;
                }
                b'E' => {
                    deposition = value;
                    self.last_deposition = value;
                }
                _ => {}
            }
        }

        // A move without a Z field stays on the last commanded layer height.
        if !z_seen {
            self.position.z = self.last_z;
        }

        Some(Waypoint {
            position: self.position,
            deposition,
        })
    }
}

impl Default for MotionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the full line sequence through a [`MotionState`], producing one
/// waypoint per linear move. `progress` advances once per input line so a
/// caller on another thread can watch long parses.
pub fn parse_waypoints(lines: &[String], progress: Progress) -> Vec<Waypoint> {
    progress.set_total(lines.len() as u64);

    let mut state = MotionState::new();
    let mut waypoints = Vec::new();
    for line in lines {
        if let Some(waypoint) = state.apply(line) {
            waypoints.push(waypoint);
        }
        progress.advance(1);
    }

    progress.set_finished();
    waypoints
}

#[cfg(test)]
mod tests {
    use common::{progress::Progress, Pos};

    use super::{parse_waypoints, MotionState, Waypoint};

    fn lines(raw: &str) -> Vec<String> {
        raw.lines().map(String::from).collect()
    }

    fn waypoint(x: f64, y: f64, z: f64, deposition: f64) -> Waypoint {
        Waypoint {
            position: Pos::new(x, y, z),
            deposition,
        }
    }

    #[test]
    fn unspecified_axes_carry_forward() {
        let waypoints = parse_waypoints(
            &lines("G1 X10 Y0 Z0.2 E1\nG1 X20 Y0 E2\nG1 X20 Y10 Z0.4 E2"),
            Progress::new(),
        );

        assert_eq!(
            waypoints,
            vec![
                waypoint(10.0, 0.0, 0.2, 1.0),
                waypoint(20.0, 0.0, 0.2, 2.0),
                waypoint(20.0, 10.0, 0.4, 2.0),
            ]
        );
    }

    #[test]
    fn bare_move_repeats_previous_state() {
        let mut state = MotionState::new();
        state.apply("G1 X5 Y5 Z1 E3");

        assert_eq!(state.apply("G1"), Some(waypoint(5.0, 5.0, 1.0, 3.0)));
    }

    #[test]
    fn first_move_starts_from_defaults() {
        let mut state = MotionState::new();
        assert_eq!(state.apply("G1"), Some(waypoint(0.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn malformed_field_is_ignored() {
        let mut state = MotionState::new();
        let waypoint = state.apply("G1 Xnot-a-number Y2 E").unwrap();

        assert_eq!(waypoint.position, Pos::new(0.0, 2.0, 0.0));
        assert_eq!(waypoint.deposition, 0.0);
    }

    #[test]
    fn signs_and_fractions_parse() {
        let mut state = MotionState::new();
        let waypoint = state.apply("G1 X-1.5 Y+2.5 Z.5").unwrap();

        assert_eq!(waypoint.position, Pos::new(-1.5, 2.5, 0.5));
    }

    #[test]
    fn non_motion_lines_are_skipped() {
        let waypoints = parse_waypoints(
            &lines("; comment\nM104 S200\nG0 X5\nG10 X7\nG1 X1"),
            Progress::new(),
        );

        assert_eq!(waypoints, vec![waypoint(1.0, 0.0, 0.0, 0.0)]);
    }

    #[test]
    fn skipped_lines_leave_state_untouched() {
        let mut state = MotionState::new();
        state.apply("G1 X3 Z0.6");
        assert_eq!(state.apply("G0 X99 Z99"), None);

        assert_eq!(state.apply("G1"), Some(waypoint(3.0, 0.0, 0.6, 0.0)));
    }

    #[test]
    fn empty_input_yields_no_waypoints() {
        assert!(parse_waypoints(&[], Progress::new()).is_empty());
    }

    #[test]
    fn unrelated_fields_are_ignored() {
        let mut state = MotionState::new();
        let waypoint = state.apply("G1 X1 F1500 S0").unwrap();

        assert_eq!(waypoint.position, Pos::new(1.0, 0.0, 0.0));
    }
}
