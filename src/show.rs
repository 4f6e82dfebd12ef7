use itertools::Itertools;

use crate::automaton::Automaton;

impl std::fmt::Display for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let transitions = self
            .edges()
            .map(|(p, a, q)| {
                format!(
                    "{}({})->{}",
                    self.state_name(p),
                    self.alphabet().symbol(a),
                    self.state_name(q)
                )
            })
            .join(", ");
        writeln!(f, "Q = {}", self.show_states(self.state_indices()))?;
        writeln!(f, "A = {}", self.alphabet())?;
        writeln!(f, "r = {{{transitions}}}")?;
        writeln!(f, "s = {}", self.show_states(self.initial_states()))?;
        writeln!(f, "F = {}", self.show_states(self.final_states()))
    }
}

impl Automaton {
    /// Returns a string representation of the transition table. Initial states are prefixed with
    /// `->` and final states with `*`, a cell lists all successors of the state on the letter.
    pub fn transition_table(&self) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain(self.alphabet().symbols().map(String::from)),
        );
        for q in self.state_indices() {
            let marker = match (self.is_initial(q), self.is_final(q)) {
                (true, true) => "->*",
                (true, false) => "->",
                (false, true) => "*",
                (false, false) => "",
            };
            let mut row = vec![format!("{marker}{}", self.state_name(q))];
            for a in self.alphabet().letters() {
                let successors = self.successors(q, a);
                if successors.is_empty() {
                    row.push("-".to_string());
                } else {
                    row.push(successors.iter().map(|&p| self.state_name(p)).join(", "));
                }
            }
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}
