//! One generation of candidate commands.
//!
//! Ordering is a derived property, re-established every generation: fitness
//! descending, ties broken by volume descending so equally beneficial larger
//! edits win (fewer total commits to reach the target).

use super::command::Command;

/// Ordered collection of candidates.
#[derive(Debug, Default)]
pub struct Population {
    members: Vec<Command>,
}

impl Population {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
        }
    }

    pub fn from_members(members: Vec<Command>) -> Self {
        Self { members }
    }

    pub fn push(&mut self, command: Command) {
        self.members.push(command);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Command] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [Command] {
        &mut self.members
    }

    /// Sort by fitness descending, then volume descending.
    pub fn sort(&mut self) {
        self.members
            .sort_by(|a, b| b.fitness.cmp(&a.fitness).then(b.volume().cmp(&a.volume())));
    }

    /// Highest-fitness member (volume breaks ties), regardless of sort state.
    pub fn best(&self) -> Option<&Command> {
        self.members
            .iter()
            .max_by(|a, b| a.fitness.cmp(&b.fitness).then(a.volume().cmp(&b.volume())))
    }

    /// Mean fitness over the population. Diagnostic only.
    pub fn average_fitness(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        let total: i64 = self.members.iter().map(|c| c.fitness).sum();
        total as f64 / self.members.len() as f64
    }

    /// How many leading members survive as parents for the given fraction.
    /// At least one, at most the whole population.
    pub fn parent_count(&self, survivor_rate: f64) -> usize {
        ((self.members.len() as f64 * survivor_rate).round() as usize)
            .max(1)
            .min(self.members.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(fitness: i64, extent: i32) -> Command {
        let mut cmd = Command::new(0, 1, [0, 0, 0], [extent, 0, 0]);
        cmd.fitness = fitness;
        cmd
    }

    #[test]
    fn test_sort_order() {
        let mut population = Population::default();
        population.push(command(1, 0));
        population.push(command(5, 0));
        population.push(command(5, 3));
        population.push(command(-2, 0));
        population.sort();

        let members = population.members();
        // No lower fitness ever precedes a strictly higher one.
        for pair in members.windows(2) {
            assert!(pair[0].fitness >= pair[1].fitness);
            if pair[0].fitness == pair[1].fitness {
                assert!(pair[0].volume() >= pair[1].volume());
            }
        }
        // Equal fitness: larger volume first.
        assert_eq!(members[0].fitness, 5);
        assert_eq!(members[0].volume(), 4);
    }

    #[test]
    fn test_best_and_average() {
        let mut population = Population::default();
        assert!(population.best().is_none());
        assert_eq!(population.average_fitness(), 0.0);

        population.push(command(3, 0));
        population.push(command(-1, 0));
        population.push(command(7, 0));
        assert_eq!(population.best().unwrap().fitness, 7);
        assert_eq!(population.average_fitness(), 3.0);
    }

    #[test]
    fn test_parent_count() {
        let mut population = Population::default();
        for _ in 0..10 {
            population.push(command(0, 0));
        }
        assert_eq!(population.parent_count(0.5), 5);
        assert_eq!(population.parent_count(0.01), 1);
        assert_eq!(population.parent_count(1.0), 10);
    }
}
