//! Authoritative list of live objects

use super::component::{Capabilities, TackComponent};
use super::object::{ObjectState, TackObject};
use super::ObjectRef;
use crate::components::Camera;
use crate::context::ComponentContext;
use crate::foundation::math::Vec2;
use crate::render::{TackRenderer, ViewTransform};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

/// Length of an object identity hash
pub const HASH_LENGTH: usize = 16;

/// Object manager
///
/// Lookups are linear scans. Per-frame fan-out iterates a snapshot taken at
/// the start of the pass, so hooks may add or remove objects freely.
#[derive(Default)]
pub struct TackObjectManager {
    objects: Vec<ObjectRef>,
    issued_hashes: HashSet<String>,
    main_camera: Option<Weak<TackObject>>,
}

impl TackObjectManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object and register it
    pub fn create(&mut self, name: &str, position: Vec2, scale: Vec2) -> ObjectRef {
        let hash = self.generate_hash();
        let object = Rc::new(TackObject::new(
            hash,
            name,
            ObjectState {
                position,
                scale,
                rotation: 0.0,
            },
        ));
        self.objects.push(Rc::clone(&object));
        log::debug!("Created object '{}' ({})", name, object.hash());
        object
    }

    /// Random alphanumeric hash never issued before in this manager
    fn generate_hash(&mut self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let hash: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(HASH_LENGTH)
                .map(char::from)
                .collect();
            if self.issued_hashes.insert(hash.clone()) {
                return hash;
            }
            log::debug!("Object hash collision on {}, regenerating", hash);
        }
    }

    /// Register an object
    ///
    /// Adding an object already present (by identity) logs an error and
    /// returns false.
    pub fn add(&mut self, object: &ObjectRef) -> bool {
        if self.contains(object) {
            log::error!("Object '{}' ({}) is already registered", object.name(), object.hash());
            return false;
        }
        self.objects.push(Rc::clone(object));
        true
    }

    /// Unregister an object
    ///
    /// Removing an absent object logs a warning and returns false.
    pub fn remove(&mut self, object: &ObjectRef) -> bool {
        let Some(index) = self.objects.iter().position(|live| Rc::ptr_eq(live, object)) else {
            log::warn!("Object '{}' ({}) is not registered", object.name(), object.hash());
            return false;
        };
        self.objects.remove(index);
        true
    }

    /// Whether the object is registered
    pub fn contains(&self, object: &ObjectRef) -> bool {
        self.objects.iter().any(|live| Rc::ptr_eq(live, object))
    }

    /// Point-in-time copy of the live list
    pub fn get_all(&self) -> Vec<ObjectRef> {
        self.objects.clone()
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no object is live
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// First object with `name`
    pub fn find_by_name(&self, name: &str) -> Option<ObjectRef> {
        self.objects.iter().find(|object| object.name() == name).cloned()
    }

    /// Object with identity `hash`
    pub fn find_by_hash(&self, hash: &str) -> Option<ObjectRef> {
        self.objects.iter().find(|object| object.hash() == hash).cloned()
    }

    /// Attach a component to an object
    ///
    /// Attaching while the object's own hooks are running is rejected with a
    /// logged error and no side effect. The first camera-capable component
    /// attached becomes the main camera.
    pub fn attach_component<C: TackComponent>(&mut self, object: &ObjectRef, component: C) -> bool {
        let is_camera = component.capabilities().contains(Capabilities::CAMERA);
        if !object.push_component(Box::new(component)) {
            log::error!(
                "Cannot attach {} to '{}' while its components are busy",
                std::any::type_name::<C>(),
                object.name()
            );
            return false;
        }

        if is_camera && self.main_camera().is_none() {
            self.main_camera = Some(Rc::downgrade(object));
            log::info!("'{}' is now the main camera", object.name());
        }
        true
    }

    /// Detach the first component of type `C`
    pub fn detach_component<C: TackComponent>(&mut self, object: &ObjectRef) -> Option<C> {
        let component = object.take_component::<C>()?;
        let was_main = self
            .main_camera()
            .is_some_and(|camera| Rc::ptr_eq(&camera, object));
        if was_main && !object.has_capability(Capabilities::CAMERA) {
            self.main_camera = None;
            log::info!("Main camera detached from '{}'", object.name());
        }
        Some(component)
    }

    /// Object holding the main camera, if it is still alive
    pub fn main_camera(&self) -> Option<ObjectRef> {
        self.main_camera.as_ref().and_then(Weak::upgrade)
    }

    /// View defined by the main camera
    pub fn main_camera_view(&self) -> Option<ViewTransform> {
        let object = self.main_camera()?;
        let camera = object.get_component::<Camera>()?;
        Some(ViewTransform {
            position: object.position(),
            screen: camera.screen_size(),
        })
    }

    // Per-frame fan-out

    /// Start components of every live object
    pub(crate) fn start_all(ctx: &mut ComponentContext<'_>) {
        for object in ctx.objects.get_all() {
            object.start_components(ctx);
        }
    }

    /// Update components of every object live at the start of the pass
    pub(crate) fn update_all(ctx: &mut ComponentContext<'_>) {
        for object in ctx.objects.get_all() {
            object.update_components(ctx);
        }
    }

    /// Close components of every live object
    pub(crate) fn close_all(ctx: &mut ComponentContext<'_>) {
        for object in ctx.objects.get_all() {
            object.close_components(ctx);
        }
    }

    /// World pass over render-capable components
    pub(crate) fn render_all(&self, renderer: &mut TackRenderer) {
        for object in self.get_all() {
            object.render_components(renderer);
        }
    }

    /// GUI pass over GUI-capable components
    pub(crate) fn gui_render_all(&self, renderer: &mut TackRenderer) {
        for object in self.get_all() {
            object.gui_render_components(renderer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::QuadRenderer;
    use crate::foundation::math::{Colour4, ScreenSize};

    #[derive(Debug, Default)]
    struct Marker(u32);
    impl TackComponent for Marker {}

    #[test]
    fn test_hashes_are_unique_alphanumeric() {
        let mut manager = TackObjectManager::new();
        let mut seen = HashSet::new();
        for i in 0..500 {
            let object = manager.create(&format!("o{i}"), Vec2::zeros(), Vec2::new(1.0, 1.0));
            assert_eq!(object.hash().len(), HASH_LENGTH);
            assert!(object.hash().chars().all(|c| c.is_ascii_alphanumeric()));
            assert!(seen.insert(object.hash().to_string()));
        }
    }

    #[test]
    fn test_add_rejects_same_identity() {
        let mut manager = TackObjectManager::new();
        let object = manager.create("player", Vec2::zeros(), Vec2::new(1.0, 1.0));
        assert!(!manager.add(&object));
        assert_eq!(manager.len(), 1);

        assert!(manager.remove(&object));
        assert!(!manager.remove(&object));
        assert!(manager.add(&object));
    }

    #[test]
    fn test_get_all_is_a_snapshot() {
        let mut manager = TackObjectManager::new();
        let first = manager.create("a", Vec2::zeros(), Vec2::new(1.0, 1.0));
        let snapshot = manager.get_all();
        manager.create("b", Vec2::zeros(), Vec2::new(1.0, 1.0));
        manager.remove(&first);

        assert_eq!(snapshot.len(), 1);
        assert!(Rc::ptr_eq(&snapshot[0], &first));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_lookup_by_name_and_hash() {
        let mut manager = TackObjectManager::new();
        let object = manager.create("enemy", Vec2::zeros(), Vec2::new(1.0, 1.0));
        manager.create("enemy", Vec2::zeros(), Vec2::new(1.0, 1.0));

        let by_name = manager.find_by_name("enemy").unwrap();
        assert!(Rc::ptr_eq(&by_name, &object));
        let by_hash = manager.find_by_hash(object.hash()).unwrap();
        assert!(Rc::ptr_eq(&by_hash, &object));
        assert!(manager.find_by_name("nobody").is_none());
    }

    #[test]
    fn test_first_component_of_type_wins() {
        let mut manager = TackObjectManager::new();
        let object = manager.create("a", Vec2::zeros(), Vec2::new(1.0, 1.0));
        manager.attach_component(&object, Marker(1));
        manager.attach_component(&object, Marker(2));

        assert_eq!(object.component_count(), 2);
        assert_eq!(object.get_component::<Marker>().map(|marker| marker.0), Some(1));
    }

    #[test]
    fn test_missing_component_is_none() {
        let mut manager = TackObjectManager::new();
        let object = manager.create("a", Vec2::zeros(), Vec2::new(1.0, 1.0));
        manager.attach_component(&object, Marker(1));
        assert!(object.get_component::<QuadRenderer>().is_none());
        assert!(!object.has_component::<QuadRenderer>());
    }

    #[test]
    fn test_component_mut_and_detach() {
        let mut manager = TackObjectManager::new();
        let object = manager.create("a", Vec2::zeros(), Vec2::new(1.0, 1.0));
        manager.attach_component(&object, Marker(1));

        if let Some(mut marker) = object.get_component_mut::<Marker>() {
            marker.0 = 7;
        }
        let detached = manager.detach_component::<Marker>(&object).unwrap();
        assert_eq!(detached.0, 7);
        assert_eq!(object.component_count(), 0);
        assert!(manager.detach_component::<Marker>(&object).is_none());
    }

    #[test]
    fn test_first_camera_becomes_main() {
        let mut manager = TackObjectManager::new();
        let first = manager.create("cam1", Vec2::new(5.0, 5.0), Vec2::new(1.0, 1.0));
        let second = manager.create("cam2", Vec2::zeros(), Vec2::new(1.0, 1.0));
        manager.attach_component(&first, Camera::new(ScreenSize::new(320.0, 240.0)));
        manager.attach_component(&second, Camera::new(ScreenSize::new(640.0, 480.0)));

        let main = manager.main_camera().unwrap();
        assert!(Rc::ptr_eq(&main, &first));

        let view = manager.main_camera_view().unwrap();
        assert_eq!(view.position, Vec2::new(5.0, 5.0));
        assert_eq!(view.screen, ScreenSize::new(320.0, 240.0));

        manager.detach_component::<Camera>(&first);
        assert!(manager.main_camera().is_none());
    }

    #[test]
    fn test_non_camera_components_do_not_claim_camera() {
        let mut manager = TackObjectManager::new();
        let object = manager.create("a", Vec2::zeros(), Vec2::new(1.0, 1.0));
        manager.attach_component(&object, QuadRenderer::colour(Colour4::RED));
        assert!(manager.main_camera().is_none());
    }
}
