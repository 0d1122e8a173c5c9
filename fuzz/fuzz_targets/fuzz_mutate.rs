#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tidal_gp::gp::{Genome, GrowthConfig, Operator, generate};
use tidal_gp::grammar::{Catalog, round_trips};
use tidal_gp::MAX_TREE_DEPTH;

/// A seed for the starting tree and a sequence of operator picks.
#[derive(Arbitrary, Debug)]
struct MutationInput {
    /// Seeds both the generator and the operators.
    seed: u64,
    /// Operator indices, taken modulo the operator count.
    ops: Vec<u8>,
    /// Cross the result with a second tree grown from this seed.
    partner: Option<u64>,
}

fuzz_target!(|input: MutationInput| {
    let catalog = Catalog::default();
    let mut rng = Xoshiro256StarStar::seed_from_u64(input.seed);
    let mut tree = generate(&GrowthConfig::default(), &catalog, &mut rng);

    for &pick in input.ops.iter().take(64) {
        let op = Operator::ALL[usize::from(pick) % Operator::ALL.len()];
        if let Ok(next) = op.apply(&tree, &catalog, &mut rng) {
            tree = next;
        }
        assert!(tree.depth() <= MAX_TREE_DEPTH);
        assert!(round_trips(&tree), "{op} broke {tree}");
    }

    if let Some(partner) = input.partner {
        let mut other_rng = Xoshiro256StarStar::seed_from_u64(partner);
        let other = Genome::new(generate(&GrowthConfig::default(), &catalog, &mut other_rng));
        let this = Genome::new(tree);
        let (x, y) = this.crossover(&other, &mut rng);
        assert!(round_trips(x.tree()) && round_trips(y.tree()));
        assert_eq!(
            x.tree().size() + y.tree().size(),
            this.tree().size() + other.tree().size()
        );
    }
});
