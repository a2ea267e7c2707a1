use core::marker::PhantomData;

use bevy::prelude::*;
use bevy::state::state::FreelyMutableState;

/// Asks the bit to start over. Sent by menu buttons and key bindings alike.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RestartRequested;

pub trait Restartable: Resource {
    fn reset(&mut self);
    fn initial_state() -> Self::State;
    type State: States + FreelyMutableState;
}

pub fn handle_restart<T: Restartable>(
    mut requests: EventReader<RestartRequested>,
    mut next_state: ResMut<NextState<T::State>>,
    mut restartable: ResMut<T>,
) {
    // Several requests in one frame still restart once.
    if requests.read().count() == 0 {
        return;
    }
    restartable.reset();
    next_state.set(T::initial_state());
}

/// Wires [`RestartRequested`] to a [`Restartable`] resource.
pub struct RestartPlugin<T: Restartable>(PhantomData<T>);

impl<T: Restartable> Default for RestartPlugin<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: Restartable> Plugin for RestartPlugin<T> {
    fn build(&self, app: &mut App) {
        app.add_event::<RestartRequested>().add_systems(
            Update,
            handle_restart::<T>.run_if(resource_exists::<T>),
        );
    }
}
