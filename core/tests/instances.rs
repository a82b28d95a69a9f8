use libtest_mimic::{Arguments, Failed};
use polyweight_core::{
    types::outcomes_coincide, ExplorationConfig, ExplorationMode, ExplorationStatus, Explorer,
    Limits, MaybeTerminatedError, Solution,
};

use setup::{Expected, Instance, TestSetup};

const EPS: f64 = 1e-5;

fn main() {
    let args = Arguments::from_args();
    let mut tests = vec![];

    tests.extend(TestSetup::new("auto", ExplorationMode::Auto).collect_tests());
    tests.extend(TestSetup::new("weight-space", ExplorationMode::WeightSpaceOnly).collect_tests());

    libtest_mimic::run(&args, tests).exit();
}

fn run_test(inst: Instance, mode: ExplorationMode) -> Result<(), Failed> {
    let config = ExplorationConfig::default().with_mode(mode);
    let mut explorer = Explorer::new(inst.oracle, config)?;
    match explorer.explore(Limits::none()) {
        MaybeTerminatedError::Done(_) => (),
        MaybeTerminatedError::Terminated(t) => {
            return Err(format!("exploration terminated early: {t}").into())
        }
        MaybeTerminatedError::Error(e) => return Err(format!("exploration error: {e:#}").into()),
    }
    if explorer.status() != ExplorationStatus::Finished {
        return Err(format!("unexpected final status {}", explorer.status()).into());
    }
    if explorer.dominated_points_found() {
        return Err("dominated outcomes among the results".into());
    }

    let found: Vec<&Solution> = explorer
        .bounded()
        .iter()
        .chain(explorer.unsupported())
        .collect();
    for (idx, sol) in found.iter().enumerate() {
        if found[idx + 1..]
            .iter()
            .any(|other| outcomes_coincide(sol.outcome(), other.outcome(), EPS))
        {
            return Err(format!("outcome {:?} found twice", sol.outcome()).into());
        }
        let known = inst.expected.iter().any(|(kind, outcome)| {
            *kind != Expected::Dominated && outcomes_coincide(sol.outcome(), outcome, EPS)
        });
        if !known {
            return Err(format!("{:?} is not a non-dominated outcome", sol.outcome()).into());
        }
    }

    let two_proj = mode == ExplorationMode::Auto && inst.n_objs <= 3;
    for (kind, outcome) in &inst.expected {
        let required = match kind {
            Expected::ExtremeSupported => explorer.bounded().iter().collect::<Vec<_>>(),
            Expected::NonDominated if two_proj => found.clone(),
            _ => continue,
        };
        if !required
            .iter()
            .any(|sol| outcomes_coincide(sol.outcome(), outcome, EPS))
        {
            return Err(format!("missing {kind:?} outcome {outcome:?}").into());
        }
    }
    Ok(())
}

mod setup {
    use std::{
        ffi::OsStr,
        fs::File,
        io::{BufRead, BufReader},
        path::Path,
    };

    use libtest_mimic::{Failed, Trial};
    use polyweight_core::{oracle::Explicit, ExplorationMode, Outcome};

    /// What the exploration must do with an outcome of the instance
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Expected {
        /// Extreme supported, must be among the bounded outcomes
        ExtremeSupported,
        /// Non-dominated, must be found if the two-projection phase runs
        NonDominated,
        /// Must never be reported
        Dominated,
    }

    pub struct Instance {
        pub n_objs: usize,
        pub oracle: Explicit,
        pub expected: Vec<(Expected, Outcome)>,
    }

    /// Parses an instance file. Every line is either a comment starting with `c` or a
    /// feasible outcome prefixed with `s` (extreme supported), `n` (other non-dominated) or
    /// `d` (dominated).
    pub fn parse(path: &Path) -> Instance {
        let mut expected = vec![];
        for line in BufReader::new(File::open(path).expect("failed to open instance file")).lines()
        {
            let line = line.expect("failed to read instance file");
            let mut tokens = line.split_whitespace();
            let kind = match tokens.next() {
                None | Some("c") => continue,
                Some("s") => Expected::ExtremeSupported,
                Some("n") => Expected::NonDominated,
                Some("d") => Expected::Dominated,
                Some(other) => panic!("invalid line prefix `{other}`"),
            };
            let outcome: Outcome = tokens
                .map(|val| val.parse().expect("invalid outcome value"))
                .collect();
            expected.push((kind, outcome));
        }
        let n_objs = expected.first().expect("instance without outcomes").1.len();
        let oracle = Explicit::from_outcomes(n_objs, expected.iter().map(|(_, o)| o.clone()));
        Instance {
            n_objs,
            oracle,
            expected,
        }
    }

    pub struct TestSetup<'a> {
        variant: &'a str,
        mode: ExplorationMode,
    }

    impl<'a> TestSetup<'a> {
        pub fn new(variant: &'a str, mode: ExplorationMode) -> Self {
            Self { variant, mode }
        }

        pub fn collect_tests(self) -> Vec<Trial> {
            let manifest_dir = env!("CARGO_MANIFEST_DIR");
            let mut tests = vec![];
            for entry in std::fs::read_dir(format!("{manifest_dir}/data/"))
                .expect("failed to find test instances")
            {
                let entry = entry.unwrap();
                let path = entry.path();
                if !entry.file_type().unwrap().is_file()
                    || path.extension() != Some(OsStr::new("pts"))
                {
                    continue;
                }
                let name = path.file_stem().unwrap().to_str().unwrap().to_string();
                let mode = self.mode;
                tests.push(Trial::test(
                    format!("{}::{name}", self.variant),
                    move || -> Result<(), Failed> { super::run_test(parse(&path), mode) },
                ));
            }
            tests
        }
    }
}
