//! Full loop: host publishes state → poll loop → re-render → document → scene.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use spark_bridge::bridge::{BridgeClient, DispatchAction, HostBridge, PollLoop, StateStore};
use spark_bridge::reconciler::{Document, Renderer, VNode};
use spark_bridge::scene::{NativeClass, NodeId, Scene};
use spark_bridge::scheduler::Scheduler;
use spark_bridge::{Callback, props};

struct Harness {
    scene: Scene,
    scheduler: Scheduler,
    store: Arc<StateStore>,
    poll: PollLoop,
    toasts: Rc<RefCell<Vec<String>>>,
    heals: Arc<AtomicUsize>,
    _subscriptions: Vec<Box<dyn FnOnce()>>,
}

fn hud(state: &Value, heal: &Callback) -> Vec<VNode> {
    let hp = state["player"]["hp"].as_i64().unwrap_or(0);
    let items: Vec<VNode> = state["inventory"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|item| VNode::element("label", props! { "class" => "text-sm" }, vec![VNode::text(item)]))
                .collect()
        })
        .unwrap_or_default();

    vec![VNode::element(
        "vbox",
        props! { "class" => "gap-2 p-4 bg-slate-900" },
        vec![
            VNode::element("label", props! { "class" => "text-lg" }, vec![VNode::text(format!("HP {hp}"))]),
            VNode::element("button", props! { "onPress" => heal.clone() }, vec![VNode::text("Heal")]),
            VNode::element("vbox", props! {}, items),
        ],
    )]
}

fn setup() -> Harness {
    let bridge = Arc::new(HostBridge::new());
    let store = Arc::new(StateStore::new(Arc::clone(&bridge)));
    let heals = Arc::new(AtomicUsize::new(0));

    // Host: heal requests raise hp by 5.
    {
        let (store, heals) = (Arc::clone(&store), Arc::clone(&heals));
        bridge.subscribe_dispatch(move |action| {
            if !action.is("heal") {
                return;
            }
            heals.fetch_add(1, Ordering::SeqCst);
            let hp = store.get("player").and_then(|p| p["hp"].as_i64()).unwrap_or(0);
            store.set("player", &json!({ "hp": hp + 5 }));
        });
    }

    // UI.
    let scene = Scene::new();
    let scheduler = Scheduler::new();
    let client = BridgeClient::new(Arc::clone(&bridge));
    let poll = PollLoop::new(client.clone(), Rc::new(scheduler.clone()));
    let renderer = Rc::new(RefCell::new(Renderer::new(Document::new(&scene))));

    let heal = {
        let client = client.clone();
        Callback::new(move |_| client.dispatch(&DispatchAction::new("heal")))
    };
    renderer.borrow_mut().render(&hud(&client.get_snapshot(), &heal));

    let toasts = Rc::new(RefCell::new(Vec::new()));
    let mut subscriptions = Vec::new();
    {
        let renderer = Rc::clone(&renderer);
        subscriptions.push(poll.subscribe(move |snapshot| renderer.borrow_mut().render(&hud(snapshot, &heal))));
    }
    {
        let toasts = Rc::clone(&toasts);
        subscriptions.push(poll.subscribe_events(move |event| {
            if event.kind == "toast" {
                toasts.borrow_mut().push(event.payload.as_str().unwrap_or_default().to_string());
            }
        }));
    }

    Harness {
        scene,
        scheduler,
        store,
        poll,
        toasts,
        heals,
        _subscriptions: subscriptions,
    }
}

fn hud_root(scene: &Scene) -> NodeId {
    scene.children(scene.root())[0]
}

fn text(scene: &Scene, node: NodeId) -> String {
    scene
        .get(node, "text")
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default()
}

#[test]
fn test_initial_render_builds_scene() {
    let h = setup();
    let root = hud_root(&h.scene);
    assert_eq!(h.scene.class(root).unwrap(), NativeClass::VBox);
    assert_eq!(h.scene.theme_constant(root, "separation"), Some(8));

    let children = h.scene.children(root);
    assert_eq!(children.len(), 3);
    assert_eq!(text(&h.scene, children[0]), "HP 0");
    assert_eq!(h.scene.theme_font_size(children[0], "font_size"), Some(18));
    assert_eq!(h.scene.class(children[1]).unwrap(), NativeClass::Button);
    assert_eq!(text(&h.scene, children[1]), "Heal");
    assert!(h.poll.is_running());
}

#[test]
fn test_published_state_rerenders_on_next_frame() {
    let h = setup();
    h.store.set("player", &json!({ "hp": 10 }));
    let label = h.scene.children(hud_root(&h.scene))[0];

    assert_eq!(text(&h.scene, label), "HP 0");
    h.scheduler.run_frame();
    assert_eq!(text(&h.scene, label), "HP 10");
}

#[test]
fn test_button_press_round_trips_through_host() {
    let h = setup();
    h.store.set("player", &json!({ "hp": 10 }));
    h.scheduler.run_frame();

    let children = h.scene.children(hud_root(&h.scene));
    h.scene.press(children[1]);
    h.scene.press(children[1]);
    assert_eq!(h.heals.load(Ordering::SeqCst), 2);

    h.scheduler.run_frame();
    assert_eq!(text(&h.scene, children[0]), "HP 20");
}

#[test]
fn test_inventory_list_grows_and_shrinks() {
    let h = setup();
    let list = h.scene.children(hud_root(&h.scene))[2];
    let nodes_before = h.scene.node_count();

    h.store.set("inventory", &json!(["sword", "shield", "potion"]));
    h.scheduler.run_frame();
    let items = h.scene.children(list);
    assert_eq!(items.len(), 3);
    assert_eq!(text(&h.scene, items[2]), "potion");

    h.store.set("inventory", &json!(["shield"]));
    h.scheduler.run_frame();
    let items = h.scene.children(list);
    assert_eq!(items.len(), 1);
    assert_eq!(text(&h.scene, items[0]), "shield");
    assert_eq!(h.scene.node_count(), nodes_before + 1);
}

#[test]
fn test_events_reach_subscribers_once() {
    let h = setup();
    h.store.bridge().emit("toast", &"Level up!");
    h.store.bridge().emit("other", &1);
    h.scheduler.run_frame();
    h.scheduler.run_frame();

    assert_eq!(*h.toasts.borrow(), vec!["Level up!".to_string()]);
    assert_eq!(h.store.bridge().pending_events(), 0);
}

#[test]
fn test_malformed_state_renders_defaults() {
    let h = setup();
    h.store.set("player", &json!({ "hp": 10 }));
    h.scheduler.run_frame();

    h.store.bridge().set_state_json("{broken");
    h.scheduler.run_frame();

    let label = h.scene.children(hud_root(&h.scene))[0];
    assert_eq!(text(&h.scene, label), "HP 0");
}
