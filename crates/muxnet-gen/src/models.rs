//! Internal (per-layer) generative models.

/// How a layer grows when it draws an internal action.
#[derive(Debug, Clone, PartialEq)]
pub enum InternalModel {
    /// Barabási–Albert style: a new vertex joins the layer and attaches
    /// to `m` existing vertices chosen proportionally to degree. Until
    /// the layer reaches `m0` vertices, joining vertices connect to
    /// every existing vertex instead.
    PreferentialAttachment { m0: usize, m: usize },
    /// Erdős–Rényi style: one edge between two uniformly drawn actors,
    /// importing their vertices when absent.
    UniformAttachment,
}

impl InternalModel {
    /// Human-readable parameter check; the engine converts failures into
    /// configuration errors.
    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            InternalModel::PreferentialAttachment { m0, m } => {
                if *m0 == 0 {
                    return Err("preferential attachment requires m0 >= 1".to_owned());
                }
                if *m == 0 {
                    return Err("preferential attachment requires m >= 1".to_owned());
                }
                Ok(())
            }
            InternalModel::UniformAttachment => Ok(()),
        }
    }
}
