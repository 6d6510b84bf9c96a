use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

/// Asks the user to confirm a destructive action. The shell answers `true`
/// only for an explicit yes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmOperation {
    pub message: String,
}

impl Operation for ConfirmOperation {
    type Output = bool;
}

#[derive(Clone)]
pub struct Confirm<E> {
    context: CapabilityContext<ConfirmOperation, E>,
}

impl<Ev> Capability<Ev> for Confirm<Ev> {
    type Operation = ConfirmOperation;
    type MappedSelf<MappedEv> = Confirm<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Confirm::new(self.context.map_event(f))
    }
}

impl<E> Confirm<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<ConfirmOperation, E>) -> Self {
        Self { context }
    }

    pub fn ask<F>(&self, message: impl Into<String>, callback: F)
    where
        F: FnOnce(bool) -> E + Send + 'static,
    {
        let operation = ConfirmOperation {
            message: message.into(),
        };
        let context = self.context.clone();
        self.context.spawn(async move {
            let confirmed = context.request_from_shell(operation).await;
            context.update_app(callback(confirmed));
        });
    }
}
