#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct GitInfo {
    pub branch: String,
}
