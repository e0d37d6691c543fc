use std::marker::PhantomData;

use crate::crud;
use crate::entity::{Entity, EntityEvents, Event};
use crate::error::EntityError;
use crate::executor::Executor;

/// CRUD entry point that fires the entity's lifecycle hooks.
///
/// `Before*` events fire before the statement runs and can veto it by
/// returning an error; `After*` events fire only once the statement
/// succeeded.
///
/// # Example
///
/// ```ignore
/// let repo = Repository::<Account, _>::new(SqlxExecutor::connect(&url).await?);
/// let mut account = Account { email: "a@b.com".into(), ..Default::default() };
/// repo.insert(&mut account).await?;
/// ```
pub struct Repository<E, X> {
    executor: X,
    _marker: PhantomData<fn() -> E>,
}

impl<E, X> Repository<E, X> {
    pub fn new(executor: X) -> Self {
        Self {
            executor,
            _marker: PhantomData,
        }
    }

    /// Get the underlying executor reference.
    pub fn executor(&self) -> &X {
        &self.executor
    }
}

impl<E, X> Repository<E, X>
where
    E: Entity + EntityEvents,
    X: Executor,
{
    pub async fn load(&self, ent: &mut E) -> Result<(), EntityError> {
        crud::load(ent, &self.executor).await?;
        ent.on_entity_event(Event::AfterLoad).await
    }

    pub async fn insert(&self, ent: &mut E) -> Result<i64, EntityError> {
        ent.on_entity_event(Event::BeforeInsert).await?;
        let id = crud::insert(ent, &self.executor).await?;
        ent.on_entity_event(Event::AfterInsert).await?;
        Ok(id)
    }

    pub async fn update(&self, ent: &mut E) -> Result<(), EntityError> {
        ent.on_entity_event(Event::BeforeUpdate).await?;
        crud::update(ent, &self.executor).await?;
        ent.on_entity_event(Event::AfterUpdate).await
    }

    pub async fn delete(&self, ent: &mut E) -> Result<(), EntityError> {
        ent.on_entity_event(Event::BeforeDelete).await?;
        crud::delete(ent, &self.executor).await?;
        ent.on_entity_event(Event::AfterDelete).await
    }
}

impl<E, X: Clone> Clone for Repository<E, X> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            _marker: PhantomData,
        }
    }
}
