//! Walkthrough of the three ownership strategies.
//!
//! ```bash
//! cargo run --example basic
//! ```

use std::sync::Arc;

use lunabind::prelude::*;

#[derive(Debug)]
struct Player {
    name: String,
    health: i32,
}

impl HostType for Player {
    fn type_name() -> &'static str {
        "Player"
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        println!("  ~Player({})", self.name);
    }
}

fn main() {
    let mut host = Host::new();

    // --- Value: the runtime owns the object outright ---------------------
    println!("value strategy:");
    host.register::<Value<Player>>();
    let hero = host
        .push::<Value<Player>>(Player {
            name: "hero".to_string(),
            health: 100,
        })
        .expect("Player is registered");

    let ptr = host.as_typed::<Value<Player>>(hero).expect("live block");
    println!("  extracted {:?}", unsafe { &*ptr });
    host.collect(hero); // destructor runs here, in place

    // --- RawPointer: lifetime owned outside the runtime ------------------
    println!("raw pointer strategy:");
    let mut npc = Player {
        name: "npc".to_string(),
        health: 50,
    };
    host.register::<RawPointer<Player>>();
    let borrowed = host
        .push::<RawPointer<Player>>(&mut npc as *mut Player)
        .expect("Player is registered");
    let ptr = host
        .as_typed::<RawPointer<Player>>(borrowed)
        .expect("live block");
    unsafe { (*ptr).health -= 10 };
    host.collect(borrowed); // no destructor: npc is still ours
    println!("  npc after script damage: {:?}", npc);

    // --- SharedPointer: host and runtime share ownership -----------------
    println!("shared strategy:");
    host.register::<SharedPointer<Player>>();
    let boss = Arc::new(Player {
        name: "boss".to_string(),
        health: 500,
    });
    let script_ref = host
        .push::<SharedPointer<Player>>(Some(Arc::clone(&boss)))
        .expect("Player is registered");
    println!("  strong count with script alive: {}", Arc::strong_count(&boss));
    host.collect(script_ref); // releases the script's share only
    println!("  strong count after collection: {}", Arc::strong_count(&boss));
    drop(boss); // last owner: destructor runs now

    // --- Type confusion is refused, not misread --------------------------
    let err = host
        .as_typed::<Value<Player>>(hero)
        .expect_err("collected block must not validate");
    println!("stale access refused: {err}");
}
