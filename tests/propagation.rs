use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mongodb::bson::oid::ObjectId;

use arbolitos_clones::config::{ChildPolicy, PropagationConfig};
use arbolitos_clones::error::{CloneSpecError, PropagationError, StoreError};
use arbolitos_clones::memory::{InMemoryActivityLog, InMemoryPlantRepository, InMemoryZoneDirectory};
use arbolitos_clones::models::{ActivityEvent, ActivityKind, Plant, PlantStatus};
use arbolitos_clones::propagation::{CloneSpec, Propagator};
use arbolitos_clones::repository::{ActivityLog, PlantRepository, ZoneDirectory};

struct Garden {
    plants: Arc<InMemoryPlantRepository>,
    activity: Arc<InMemoryActivityLog>,
    zones: Arc<InMemoryZoneDirectory>,
    propagator: Propagator,
}

fn garden_with(config: PropagationConfig) -> Garden {
    let plants = Arc::new(InMemoryPlantRepository::new());
    let activity = Arc::new(InMemoryActivityLog::new());
    let zones = Arc::new(InMemoryZoneDirectory::new());
    let propagator = Propagator::new(plants.clone(), activity.clone(), zones.clone(), config);
    Garden {
        plants,
        activity,
        zones,
        propagator,
    }
}

fn garden() -> Garden {
    garden_with(PropagationConfig::default())
}

async fn plant(garden: &Garden, name: &str, status: PlantStatus) -> Plant {
    let plant = Plant::root(name, "", status, Some(ObjectId::new()), None);
    garden.plants.insert(&plant).await.unwrap();
    plant
}

async fn clones(garden: &Garden, parent: ObjectId, names: &[&str]) -> Vec<ObjectId> {
    let specs = names.iter().map(|n| CloneSpec::named(*n)).collect();
    let result = garden
        .propagator
        .create_clones(parent, specs, "tester")
        .await
        .unwrap();
    assert!(result.failed.is_empty(), "{:?}", result.failed);
    result.created_ids()
}

/// Walks parent links up to the root, failing if it takes more hops than there are plants.
async fn depth(repo: &InMemoryPlantRepository, id: ObjectId) -> usize {
    let limit = repo.len().await;
    let mut current = repo.find_by_id(id).await.unwrap().unwrap();
    let mut hops = 0;
    while let Some(parent_id) = current.parent_id() {
        hops += 1;
        assert!(hops <= limit, "cycle through {}", id);
        current = repo.find_by_id(parent_id).await.unwrap().unwrap();
    }
    hops
}

#[tokio::test]
async fn eligible_parents_exclude_harvested_and_dead() {
    let garden = garden();
    let flowering = plant(&garden, "En flor", PlantStatus::Flowering).await;
    let seedling = plant(&garden, "Plántula", PlantStatus::Seedling).await;
    let harvested = plant(&garden, "Cosechada", PlantStatus::Harvested).await;
    let dead = plant(&garden, "Muerta", PlantStatus::Dead).await;

    let eligible: Vec<ObjectId> = garden
        .propagator
        .list_eligible_parents()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();

    assert!(eligible.contains(&flowering.id));
    assert!(eligible.contains(&seedling.id));
    assert!(!eligible.contains(&harvested.id));
    assert!(!eligible.contains(&dead.id));
}

#[tokio::test]
async fn batch_with_one_blank_name_creates_the_rest() {
    let garden = garden();
    let a = plant(&garden, "A", PlantStatus::Vegetative).await;

    let result = garden
        .propagator
        .create_clones(
            a.id,
            vec![CloneSpec::named("B"), CloneSpec::named("C"), CloneSpec::named("   ")],
            "tester",
        )
        .await
        .unwrap();

    let created: Vec<&str> = result.created.iter().map(|c| c.spec.name.as_str()).collect();
    assert_eq!(created, vec!["B", "C"]);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].spec.name, "   ");
    assert_eq!(result.failed[0].error, CloneSpecError::BlankName);
    assert_eq!(garden.plants.len().await, 3);

    let b = result.created[0].plant_id;
    let c = result.created[1].plant_id;
    let lineage = garden.propagator.get_lineage(b).await.unwrap();
    assert_eq!(lineage.parent.map(|p| p.id), Some(a.id));
    assert!(lineage.grandparent.is_none());
    assert_eq!(lineage.siblings.iter().map(|s| s.id).collect::<Vec<_>>(), vec![c]);
    assert!(lineage.children.is_empty());
}

#[tokio::test]
async fn created_clones_are_seedlings_linked_to_their_parent() {
    let garden = garden();
    let zone = ObjectId::new();
    garden.zones.add(zone).await;
    let parent = plant(&garden, "Madre", PlantStatus::Flowering).await;
    let start = Utc::now() - Duration::days(2);

    let spec = CloneSpec {
        name: " Hija ".to_string(),
        description: Some("bandeja 3".to_string()),
        zone_id: Some(zone),
        start_date: Some(start),
    };
    let result = garden
        .propagator
        .create_clones(parent.id, vec![spec.clone()], "ana")
        .await
        .unwrap();
    assert_eq!(result.created[0].spec, spec);

    let clone = garden
        .plants
        .find_by_id(result.created[0].plant_id)
        .await
        .unwrap()
        .unwrap();
    assert!(clone.is_clone());
    assert_eq!(clone.parent_id(), Some(parent.id));
    assert_eq!(clone.name, "Hija");
    assert_eq!(clone.description, "bandeja 3");
    assert_eq!(clone.status, PlantStatus::Seedling);
    assert_eq!(clone.strain_id, parent.strain_id);
    assert_eq!(clone.zone_id, Some(zone));
    assert_eq!(clone.start_date, start);

    let events = garden.activity.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ActivityKind::CloneCreated);
    assert_eq!(events[0].user_id, "ana");
    assert_eq!(events[0].payload.source_id, Some(parent.id));
    assert_eq!(events[0].payload.plant_id, Some(clone.id));
    assert_eq!(events[0].payload.parent_status, Some(PlantStatus::Flowering));
}

#[tokio::test]
async fn invalid_specs_fail_individually() {
    let garden = garden_with(PropagationConfig {
        max_name_len: 8,
        ..PropagationConfig::default()
    });
    let known_zone = ObjectId::new();
    let unknown_zone = ObjectId::new();
    garden.zones.add(known_zone).await;
    let parent = plant(&garden, "Madre", PlantStatus::Vegetative).await;

    let specs = vec![
        CloneSpec::named("Uno"),
        CloneSpec::named("uno "),
        CloneSpec::named(""),
        CloneSpec::named("Demasiado largo"),
        CloneSpec::named("Dos").in_zone(unknown_zone),
        CloneSpec::named("Tres").in_zone(known_zone),
    ];
    let result = garden
        .propagator
        .create_clones(parent.id, specs, "tester")
        .await
        .unwrap();

    assert_eq!(result.created.len(), 2);
    let errors: Vec<CloneSpecError> = result.failed.iter().map(|f| f.error.clone()).collect();
    assert_eq!(
        errors,
        vec![
            CloneSpecError::DuplicateName("uno".to_string()),
            CloneSpecError::BlankName,
            CloneSpecError::NameTooLong { max: 8 },
            CloneSpecError::UnknownZone(unknown_zone),
        ]
    );
    assert_eq!(garden.plants.len().await, 3);
}

#[tokio::test]
async fn missing_parent_fails_the_whole_batch() {
    let garden = garden();
    let missing = ObjectId::new();

    let err = garden
        .propagator
        .create_clones(missing, vec![CloneSpec::named("Hija")], "tester")
        .await
        .unwrap_err();

    assert!(matches!(err, PropagationError::ParentNotFound(id) if id == missing));
    assert!(garden.plants.is_empty().await);
    assert!(garden.activity.events().await.is_empty());
}

#[tokio::test]
async fn non_living_parent_is_not_a_clone_source() {
    let garden = garden();
    let harvested = plant(&garden, "Cosechada", PlantStatus::Harvested).await;

    let err = garden
        .propagator
        .create_clones(harvested.id, vec![CloneSpec::named("Hija")], "tester")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PropagationError::ParentNotEligible { status: PlantStatus::Harvested, .. }
    ));
    assert_eq!(garden.plants.len().await, 1);
}

#[tokio::test]
async fn existing_clones_survive_parent_harvest() {
    let garden = garden();
    let parent = plant(&garden, "Madre", PlantStatus::Flowering).await;
    let ids = clones(&garden, parent.id, &["Hija"]).await;

    let mut harvested = parent.clone();
    harvested.status = PlantStatus::Harvested;
    garden.plants.update(&harvested).await.unwrap();

    let lineage = garden.propagator.get_lineage(ids[0]).await.unwrap();
    assert_eq!(lineage.parent.map(|p| p.status), Some(PlantStatus::Harvested));
}

#[tokio::test]
async fn root_plant_has_empty_lineage() {
    let garden = garden();
    let root = plant(&garden, "Sola", PlantStatus::Seedling).await;
    plant(&garden, "Otra raíz", PlantStatus::Seedling).await;

    let lineage = garden.propagator.get_lineage(root.id).await.unwrap();
    assert_eq!(lineage.plant.id, root.id);
    assert!(lineage.is_empty());
}

#[tokio::test]
async fn lineage_of_a_clone_of_a_clone() {
    let garden = garden();
    let grandparent = plant(&garden, "Abuela", PlantStatus::Vegetative).await;
    let parents = clones(&garden, grandparent.id, &["Madre", "Tía"]).await;
    let (mother, aunt) = (parents[0], parents[1]);
    let daughters = clones(&garden, mother, &["Hija", "Hermana"]).await;
    let cousins = clones(&garden, aunt, &["Prima"]).await;
    let granddaughter = clones(&garden, daughters[0], &["Nieta"]).await;

    let lineage = garden.propagator.get_lineage(daughters[0]).await.unwrap();
    assert_eq!(lineage.parent.map(|p| p.id), Some(mother));
    assert_eq!(lineage.grandparent.map(|p| p.id), Some(grandparent.id));
    assert_eq!(
        lineage.siblings.iter().map(|s| s.id).collect::<Vec<_>>(),
        vec![daughters[1]]
    );
    assert!(!lineage.siblings.iter().any(|s| s.id == cousins[0] || s.id == aunt));
    assert_eq!(
        lineage.children.iter().map(|c| c.id).collect::<Vec<_>>(),
        granddaughter
    );

    // Only the immediate generation below is listed.
    let top = garden.propagator.get_lineage(grandparent.id).await.unwrap();
    assert_eq!(top.children.len(), 2);
    assert!(top.siblings.is_empty());

    assert_eq!(depth(&garden.plants, granddaughter[0]).await, 3);
    for plant in garden.plants.list_all().await.unwrap() {
        assert_eq!(plant.is_clone(), plant.parent_id().is_some());
        depth(&garden.plants, plant.id).await;
    }
}

#[tokio::test]
async fn lineage_of_missing_plant_fails() {
    let garden = garden();
    let missing = ObjectId::new();
    let err = garden.propagator.get_lineage(missing).await.unwrap_err();
    assert!(matches!(err, PropagationError::PlantNotFound(id) if id == missing));
}

#[tokio::test]
async fn statistics_start_at_zero() {
    let garden = garden();
    let stats = garden.propagator.get_clone_statistics().await.unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.successful, 0);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.success_rate, 0.0);
    assert!(stats.top_parents.is_empty());
}

#[tokio::test]
async fn statistics_count_history_and_rank_sources() {
    let garden = garden_with(PropagationConfig {
        top_parents: 2,
        ..PropagationConfig::default()
    });
    let a = plant(&garden, "A", PlantStatus::Vegetative).await;
    let b = plant(&garden, "B", PlantStatus::Vegetative).await;
    let c = plant(&garden, "C", PlantStatus::Vegetative).await;

    let from_a = clones(&garden, a.id, &["a1", "a2", "a3"]).await;
    clones(&garden, b.id, &["b1"]).await;
    clones(&garden, c.id, &["c1"]).await;
    garden
        .propagator
        .create_clones(a.id, vec![CloneSpec::named("")], "tester")
        .await
        .unwrap();

    // Deleting a clone does not rewrite history.
    garden.propagator.delete_clone(from_a[0], "tester").await.unwrap();

    let stats = garden.propagator.get_clone_statistics().await.unwrap();
    assert_eq!(stats.successful, 5);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.total, 6);
    assert_eq!(stats.success_rate, 5.0 / 6.0);
    assert_eq!(stats.top_parents.len(), 2);
    assert_eq!(stats.top_parents[0].plant_id, a.id);
    assert_eq!(stats.top_parents[0].count, 3);
    assert_eq!(stats.top_parents[1].plant_id, b.id.min(c.id));
    assert_eq!(stats.top_parents[1].count, 1);
}

#[tokio::test]
async fn delete_clone_rejects_roots_and_missing_plants() {
    let garden = garden();
    let root = plant(&garden, "Raíz", PlantStatus::Vegetative).await;

    let err = garden.propagator.delete_clone(root.id, "tester").await.unwrap_err();
    assert!(matches!(err, PropagationError::NotAClone(id) if id == root.id));

    let missing = ObjectId::new();
    let err = garden.propagator.delete_clone(missing, "tester").await.unwrap_err();
    assert!(matches!(err, PropagationError::PlantNotFound(id) if id == missing));
    assert_eq!(garden.plants.len().await, 1);
}

#[tokio::test]
async fn delete_clone_records_activity() {
    let garden = garden();
    let root = plant(&garden, "Raíz", PlantStatus::Vegetative).await;
    let ids = clones(&garden, root.id, &["Hija"]).await;

    let removal = garden.propagator.delete_clone(ids[0], "ana").await.unwrap();
    assert_eq!(removal.parent_id, root.id);
    assert_eq!(removal.reparented, 0);
    assert!(garden.plants.find_by_id(ids[0]).await.unwrap().is_none());

    let deleted = garden
        .activity
        .list(&[ActivityKind::CloneDeleted])
        .await
        .unwrap();
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].user_id, "ana");
    assert_eq!(deleted[0].payload.plant_id, Some(ids[0]));
}

#[tokio::test]
async fn delete_clone_with_children_is_rejected_by_default() {
    let garden = garden();
    let root = plant(&garden, "Raíz", PlantStatus::Vegetative).await;
    let middle = clones(&garden, root.id, &["Medio"]).await[0];
    clones(&garden, middle, &["Hoja 1", "Hoja 2"]).await;

    let err = garden.propagator.delete_clone(middle, "tester").await.unwrap_err();
    assert!(matches!(err, PropagationError::HasChildren { count: 2, .. }));
    assert!(garden.plants.find_by_id(middle).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_clone_with_children_can_reparent() {
    let garden = garden_with(PropagationConfig {
        child_policy: ChildPolicy::Reparent,
        ..PropagationConfig::default()
    });
    let root = plant(&garden, "Raíz", PlantStatus::Vegetative).await;
    let middle = clones(&garden, root.id, &["Medio"]).await[0];
    let leaves = clones(&garden, middle, &["Hoja 1", "Hoja 2"]).await;

    let removal = garden.propagator.delete_clone(middle, "tester").await.unwrap();
    assert_eq!(removal.reparented, 2);

    for leaf in leaves {
        let lineage = garden.propagator.get_lineage(leaf).await.unwrap();
        assert_eq!(lineage.parent.map(|p| p.id), Some(root.id));
        assert!(lineage.grandparent.is_none());
        assert_eq!(lineage.siblings.len(), 1);
        assert_eq!(depth(&garden.plants, leaf).await, 1);
    }
}

struct BrokenActivityLog;

#[async_trait]
impl ActivityLog for BrokenActivityLog {
    async fn record(&self, _event: ActivityEvent) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("activity down".to_string()))
    }

    async fn list(&self, _kinds: &[ActivityKind]) -> Result<Vec<ActivityEvent>, StoreError> {
        Err(StoreError::Unavailable("activity down".to_string()))
    }
}

#[tokio::test]
async fn activity_failures_do_not_undo_clones() {
    let plants = Arc::new(InMemoryPlantRepository::new());
    let propagator = Propagator::new(
        plants.clone(),
        Arc::new(BrokenActivityLog),
        Arc::new(InMemoryZoneDirectory::new()),
        PropagationConfig::default(),
    );
    let parent = Plant::root("Madre", "", PlantStatus::Vegetative, None, None);
    plants.insert(&parent).await.unwrap();

    let result = propagator
        .create_clones(parent.id, vec![CloneSpec::named("Hija")], "tester")
        .await
        .unwrap();
    assert_eq!(result.created.len(), 1);
    assert_eq!(plants.len().await, 2);

    assert!(matches!(
        propagator.get_clone_statistics().await,
        Err(PropagationError::Repository(StoreError::Unavailable(_)))
    ));
}

/// Lets `remaining` inserts through, then reports the store as unavailable.
/// Deletes fail while `deletes_down` is set.
struct FlakyPlants {
    inner: InMemoryPlantRepository,
    remaining: AtomicUsize,
    deletes_down: AtomicBool,
}

#[async_trait]
impl PlantRepository for FlakyPlants {
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Plant>, StoreError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_parent_id(&self, parent_id: ObjectId) -> Result<Vec<Plant>, StoreError> {
        self.inner.find_by_parent_id(parent_id).await
    }

    async fn find_by_status_in(&self, statuses: &[PlantStatus]) -> Result<Vec<Plant>, StoreError> {
        self.inner.find_by_status_in(statuses).await
    }

    async fn list_all(&self) -> Result<Vec<Plant>, StoreError> {
        self.inner.list_all().await
    }

    async fn insert(&self, plant: &Plant) -> Result<(), StoreError> {
        let left = self.remaining.load(Ordering::SeqCst);
        if left == 0 {
            return Err(StoreError::Unavailable("plants down".to_string()));
        }
        self.remaining.store(left - 1, Ordering::SeqCst);
        self.inner.insert(plant).await
    }

    async fn update(&self, plant: &Plant) -> Result<bool, StoreError> {
        self.inner.update(plant).await
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError> {
        if self.deletes_down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("plants down".to_string()));
        }
        self.inner.delete(id).await
    }

    async fn reparent_children(
        &self,
        from: ObjectId,
        to: Option<ObjectId>,
    ) -> Result<u64, StoreError> {
        self.inner.reparent_children(from, to).await
    }
}

#[tokio::test]
async fn storage_failure_mid_batch_reports_committed_clones() {
    let flaky = Arc::new(FlakyPlants {
        inner: InMemoryPlantRepository::new(),
        remaining: AtomicUsize::new(1),
        deletes_down: AtomicBool::new(false),
    });
    let parent = Plant::root("Madre", "", PlantStatus::Vegetative, None, None);
    flaky.inner.insert(&parent).await.unwrap();
    let propagator = Propagator::new(
        flaky.clone(),
        Arc::new(InMemoryActivityLog::new()),
        Arc::new(InMemoryZoneDirectory::new()),
        PropagationConfig::default(),
    );

    let specs = ["Uno", "", "Dos", "Tres", "Cuatro"]
        .into_iter()
        .map(|name| CloneSpec::named(name))
        .collect();
    let err = propagator
        .create_clones(parent.id, specs, "tester")
        .await
        .unwrap_err();

    match err {
        PropagationError::BatchInterrupted { result, source } => {
            assert_eq!(result.created.len(), 1);
            assert_eq!(result.failed.len(), 1);
            assert!(matches!(source, StoreError::Unavailable(_)));
            let names: Vec<&str> = result.created.iter().map(|c| c.spec.name.as_str()).collect();
            assert_eq!(names, vec!["Uno"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(flaky.inner.len().await, 2);
}

struct DownZones;

#[async_trait]
impl ZoneDirectory for DownZones {
    async fn zone_exists(&self, _id: ObjectId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("zones down".to_string()))
    }
}

#[tokio::test]
async fn repository_errors_propagate_from_reads() {
    let plants = Arc::new(InMemoryPlantRepository::new());
    let parent = Plant::root("Madre", "", PlantStatus::Vegetative, None, None);
    plants.insert(&parent).await.unwrap();
    let propagator = Propagator::new(
        plants.clone(),
        Arc::new(InMemoryActivityLog::new()),
        Arc::new(DownZones),
        PropagationConfig::default(),
    );

    // Specs without a zone never hit the zone directory.
    let result = propagator
        .create_clones(parent.id, vec![CloneSpec::named("Hija")], "tester")
        .await
        .unwrap();
    assert_eq!(result.created.len(), 1);

    let err = propagator
        .create_clones(
            parent.id,
            vec![CloneSpec::named("Zonificada").in_zone(ObjectId::new())],
            "tester",
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PropagationError::BatchInterrupted { source: StoreError::Unavailable(_), .. }
    ));
}

#[tokio::test]
async fn failed_delete_after_reparent_leaves_a_valid_forest() {
    let flaky = Arc::new(FlakyPlants {
        inner: InMemoryPlantRepository::new(),
        remaining: AtomicUsize::new(usize::MAX),
        deletes_down: AtomicBool::new(true),
    });
    let activity = Arc::new(InMemoryActivityLog::new());
    let propagator = Propagator::new(
        flaky.clone(),
        activity.clone(),
        Arc::new(InMemoryZoneDirectory::new()),
        PropagationConfig {
            child_policy: ChildPolicy::Reparent,
            ..PropagationConfig::default()
        },
    );
    let root = Plant::root("Raíz", "", PlantStatus::Vegetative, None, None);
    flaky.inner.insert(&root).await.unwrap();
    let middle = propagator
        .create_clones(root.id, vec![CloneSpec::named("Medio")], "tester")
        .await
        .unwrap()
        .created_ids()[0];
    let leaves = propagator
        .create_clones(
            middle,
            vec![CloneSpec::named("Hoja 1"), CloneSpec::named("Hoja 2")],
            "tester",
        )
        .await
        .unwrap()
        .created_ids();

    let err = propagator.delete_clone(middle, "tester").await.unwrap_err();
    assert!(matches!(err, PropagationError::Repository(StoreError::Unavailable(_))));

    // Children already sit under the root; the clone survives without children.
    for leaf in &leaves {
        let plant = flaky.inner.find_by_id(*leaf).await.unwrap().unwrap();
        assert_eq!(plant.parent_id(), Some(root.id));
    }
    assert!(flaky.inner.find_by_id(middle).await.unwrap().is_some());
    assert!(flaky.inner.find_by_parent_id(middle).await.unwrap().is_empty());
    assert!(activity
        .list(&[ActivityKind::CloneDeleted])
        .await
        .unwrap()
        .is_empty());

    flaky.deletes_down.store(false, Ordering::SeqCst);
    let removal = propagator.delete_clone(middle, "tester").await.unwrap();
    assert_eq!(removal.reparented, 0);
    assert!(flaky.inner.find_by_id(middle).await.unwrap().is_none());
    assert_eq!(
        activity.list(&[ActivityKind::CloneDeleted]).await.unwrap().len(),
        1
    );
}

/// Holds every write for `delay` before storing it.
struct SlowActivityLog {
    inner: InMemoryActivityLog,
    delay: std::time::Duration,
}

#[async_trait]
impl ActivityLog for SlowActivityLog {
    async fn record(&self, event: ActivityEvent) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.record(event).await
    }

    async fn list(&self, kinds: &[ActivityKind]) -> Result<Vec<ActivityEvent>, StoreError> {
        self.inner.list(kinds).await
    }
}

#[tokio::test]
async fn abandoned_batch_still_records_every_committed_clone() {
    let plants = Arc::new(InMemoryPlantRepository::new());
    let activity = Arc::new(SlowActivityLog {
        inner: InMemoryActivityLog::new(),
        delay: std::time::Duration::from_millis(200),
    });
    let propagator = Propagator::new(
        plants.clone(),
        activity.clone(),
        Arc::new(InMemoryZoneDirectory::new()),
        PropagationConfig::default(),
    );
    let parent = Plant::root("Madre", "", PlantStatus::Vegetative, None, None);
    plants.insert(&parent).await.unwrap();

    let outcome = tokio::time::timeout(
        std::time::Duration::from_millis(50),
        propagator.create_clones(
            parent.id,
            vec![CloneSpec::named("A"), CloneSpec::named("B")],
            "tester",
        ),
    )
    .await;
    assert!(outcome.is_err(), "batch should still be running");

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    assert_eq!(plants.len().await, 3);
    let stats = propagator.get_clone_statistics().await.unwrap();
    assert_eq!(stats.successful, 2);
    assert_eq!(stats.top_parents[0].plant_id, parent.id);
    let children = plants.find_by_parent_id(parent.id).await.unwrap();
    let recorded: Vec<Option<ObjectId>> = activity
        .inner
        .events()
        .await
        .iter()
        .map(|e| e.payload.plant_id)
        .collect();
    for child in children {
        assert!(recorded.contains(&Some(child.id)));
    }
}
