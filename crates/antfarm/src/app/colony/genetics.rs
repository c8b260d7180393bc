use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Personality {
    Peaceful,
    Aggressive,
}

impl Personality {
    const DOMINANT: Personality = Personality::Peaceful;

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Self::Peaceful
        } else {
            Self::Aggressive
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Peaceful => "peaceful",
            Self::Aggressive => "aggressive",
        }
    }
}

/// A pair of personality alleles. Peaceful is dominant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Chromosome {
    first: Personality,
    second: Personality,
}

impl Chromosome {
    pub(crate) fn new(first: Personality, second: Personality) -> Self {
        Self { first, second }
    }

    pub(crate) fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(Personality::random(rng), Personality::random(rng))
    }

    /// One allele from each parent, each combination equally likely.
    pub(crate) fn procreate<R: Rng + ?Sized>(one: Self, two: Self, rng: &mut R) -> Self {
        let from_one = if rng.gen_bool(0.5) { one.first } else { one.second };
        let from_two = if rng.gen_bool(0.5) { two.first } else { two.second };
        Self::new(from_one, from_two)
    }

    pub(crate) fn exhibited(self) -> Personality {
        if self.first == Personality::DOMINANT || self.second == Personality::DOMINANT {
            Personality::DOMINANT
        } else {
            Personality::Aggressive
        }
    }
}
