/// The two screens a quiz front-end switches between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Quiz,
    Results,
}
