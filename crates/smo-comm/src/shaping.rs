//! Extra request fields injected by the owning form.

use crate::protocol::RequestData;

/// Fills in the request fields a particular kind of form adds on top of the
/// action parameters.
///
/// Any `Fn(&mut RequestData)` closure is a strategy too.
pub trait RequestShaping: Send + Sync {
    fn shape(&self, data: &mut RequestData);
}

impl<F> RequestShaping for F
where
    F: Fn(&mut RequestData) + Send + Sync,
{
    fn shape(&self, data: &mut RequestData) {
        self(data)
    }
}

/// Parameters only.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainShaping;

impl RequestShaping for PlainShaping {
    fn shape(&self, _data: &mut RequestData) {}
}

/// Tags every request with the model and view it comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelShaping {
    pub model_name: Option<String>,
    pub view_name: Option<String>,
}

impl ModelShaping {
    pub fn new(model_name: impl Into<String>, view_name: impl Into<String>) -> Self {
        Self {
            model_name: Some(model_name.into()),
            view_name: Some(view_name.into()),
        }
    }
}

impl RequestShaping for ModelShaping {
    fn shape(&self, data: &mut RequestData) {
        data.model_name = self.model_name.clone();
        data.view_name = self.view_name.clone();
    }
}
