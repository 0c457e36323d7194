use std::fmt;

/// First times-table a learner starts on.
pub const MIN_TABLE: u8 = 2;
/// Last times-table; finishing its marathon ends the progression.
pub const MAX_TABLE: u8 = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Multiply,
    Divide,
}

/// One multiplication fact or its paired division fact.
///
/// `table` records which times-table the fact was generated for; divide facts
/// carry the product as `a`, so `a` alone does not identify the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fact {
    pub a: u16,
    pub b: u16,
    pub op: Op,
    pub table: u8,
}

impl Fact {
    /// Derived correct answer. Divide facts are built as `(table * i) / table`,
    /// so integer division is always exact here.
    pub fn answer(&self) -> u16 {
        match self.op {
            Op::Multiply => self.a * self.b,
            Op::Divide => self.a / self.b,
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Op::Multiply => write!(f, "{} × {} = ?", self.a, self.b),
            Op::Divide => write!(f, "{} ÷ {} = ?", self.a, self.b),
        }
    }
}

/// All 18 facts for one table: for each i in 1..=9, the multiply fact
/// `table × i` followed by its paired divide fact `(table * i) ÷ table`.
/// Callers validate that `table` is within [MIN_TABLE, MAX_TABLE].
pub fn generate(table: u8) -> Vec<Fact> {
    let t = u16::from(table);
    let mut facts = Vec::with_capacity(18);
    for i in 1..=9u16 {
        facts.push(Fact {
            a: t,
            b: i,
            op: Op::Multiply,
            table,
        });
        facts.push(Fact {
            a: t * i,
            b: t,
            op: Op::Divide,
            table,
        });
    }
    facts
}

/// Concatenated facts for every table in `low..=high`. The marathon stage
/// samples from `generate_range(MIN_TABLE, current_table)`.
pub fn generate_range(low: u8, high: u8) -> Vec<Fact> {
    (low..=high).flat_map(generate).collect()
}
