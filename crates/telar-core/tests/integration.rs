//! End-to-end tests for the graph engine: nesting, routing, and the
//! control tier working together.

use telar_core::{
    AudioConfig, Buffer, Message, Messenger, Module, Patch, Record, Socket, Value,
};

/// Emits a constant level (0 inputs / 1 output).
struct Level(f32);

impl Module for Level {
    fn num_inputs(&self) -> usize {
        0
    }
    fn num_outputs(&self) -> usize {
        1
    }
    fn synthesize(&mut self, _inputs: &[Socket], outputs: &mut [Buffer], _config: &AudioConfig) {
        outputs[0].fill(self.0);
    }
}

/// Holds a value settable by message; emits it every block.
///
/// Makes message delivery observable through the rendered output.
struct ParamLevel {
    value: f32,
}

impl Module for ParamLevel {
    fn num_inputs(&self) -> usize {
        0
    }
    fn num_outputs(&self) -> usize {
        1
    }
    fn synthesize(&mut self, _inputs: &[Socket], outputs: &mut [Buffer], _config: &AudioConfig) {
        outputs[0].fill(self.value);
    }
    fn receive_message(&mut self, payload: &Record, _config: &AudioConfig) -> Vec<Message> {
        if let Some(value) = payload.float("value") {
            self.value = value;
        }
        Vec::new()
    }
}

/// Scales its input by a message-settable factor.
struct Scaler {
    factor: f32,
}

impl Module for Scaler {
    fn num_inputs(&self) -> usize {
        1
    }
    fn num_outputs(&self) -> usize {
        1
    }
    fn synthesize(&mut self, inputs: &[Socket], outputs: &mut [Buffer], _config: &AudioConfig) {
        for (out, inp) in outputs[0]
            .as_mut_slice()
            .iter_mut()
            .zip(inputs[0].as_slice())
        {
            *out = inp * self.factor;
        }
    }
    fn receive_message(&mut self, payload: &Record, _config: &AudioConfig) -> Vec<Message> {
        if let Some(factor) = payload.float("factor") {
            self.factor = factor;
        }
        Vec::new()
    }
}

fn config() -> AudioConfig {
    AudioConfig::new(44_100.0, 32)
}

/// Builds a sub-patch with one addressed `Scaler` ("filter") between its
/// boundaries.
fn scaler_subpatch(identifier: &str, config: &AudioConfig) -> Patch {
    let mut sub = Patch::new(identifier, config);
    let b_in = sub.add_boundary_input();
    let filter = sub.add_module("filter", Box::new(Scaler { factor: 1.0 }));
    let b_out = sub.add_boundary_output();
    sub.connect(b_in, 0, filter, 0).unwrap();
    sub.connect(filter, 0, b_out, 0).unwrap();
    sub
}

#[test]
fn test_message_routes_into_nested_patch() {
    let config = config();
    let mut root = Patch::new("root", &config);
    let source = root.add_module("src", Box::new(Level(1.0)));
    let sub = scaler_subpatch("synth_instance", &config);
    let nested = root.add_module("synth_instance", Box::new(sub));
    let out = root.add_boundary_output();
    root.connect(source, 0, nested, 0).unwrap();
    root.connect(nested, 0, out, 0).unwrap();

    root.process_block(&config);
    assert!(root.output(0).iter().all(|&s| s == 1.0));

    // reaches the sub-patch's registered receiver
    root.send(
        "synth_instance.filter",
        Record::new().with("factor", 0.25f32),
        &config,
    );
    root.process_block(&config);
    assert!(root.output(0).iter().all(|&s| s == 0.25));
}

#[test]
fn test_unknown_root_segment_has_no_side_effect() {
    let config = config();
    let mut root = Patch::new("root", &config);
    let sub = scaler_subpatch("synth_instance", &config);
    let source = root.add_module("src", Box::new(Level(1.0)));
    let nested = root.add_module("synth_instance", Box::new(sub));
    let out = root.add_boundary_output();
    root.connect(source, 0, nested, 0).unwrap();
    root.connect(nested, 0, out, 0).unwrap();

    root.send(
        "nonexistent.filter",
        Record::new().with("factor", 0.0f32),
        &config,
    );
    root.process_block(&config);
    // dropped: the scaler still passes unity
    assert!(root.output(0).iter().all(|&s| s == 1.0));
}

#[test]
fn test_address_rooted_at_own_identifier() {
    let config = config();
    let mut root = Patch::new("root", &config);
    let param = root.add_module("level", Box::new(ParamLevel { value: 0.0 }));
    let out = root.add_boundary_output();
    root.connect(param, 0, out, 0).unwrap();

    // "root.level" and "level" resolve identically
    root.send("root.level", Record::new().with("value", 0.5f32), &config);
    root.process_block(&config);
    assert!(root.output(0).iter().all(|&s| s == 0.5));
}

#[test]
fn test_messenger_triggers_heard_same_block() {
    struct OneShot {
        fired: bool,
    }
    impl Messenger for OneShot {
        fn messages(&mut self, _timestamp: u64, _config: &AudioConfig) -> Vec<Message> {
            if self.fired {
                Vec::new()
            } else {
                self.fired = true;
                vec![Message::new(
                    "level",
                    Record::new().with("value", 0.75f32),
                )]
            }
        }
    }

    let config = config();
    let mut root = Patch::new("root", &config);
    let param = root.add_module("level", Box::new(ParamLevel { value: 0.0 }));
    let out = root.add_boundary_output();
    root.connect(param, 0, out, 0).unwrap();
    root.add_messenger("shot", Box::new(OneShot { fired: false }));

    // the messenger drains before the audio pull, so the very first block
    // already carries the new value
    root.process_block(&config);
    assert!(root.output(0).iter().all(|&s| s == 0.75));
}

#[test]
fn test_messenger_is_addressable() {
    struct Gate {
        open: bool,
    }
    impl Messenger for Gate {
        fn messages(&mut self, _timestamp: u64, _config: &AudioConfig) -> Vec<Message> {
            if self.open {
                vec![Message::new("level", Record::new().with("value", 1.0f32))]
            } else {
                Vec::new()
            }
        }
        fn receive_message(&mut self, payload: &Record) {
            match payload.command() {
                Some("start") => self.open = true,
                Some("stop") => self.open = false,
                _ => {}
            }
        }
    }

    let config = config();
    let mut root = Patch::new("root", &config);
    let param = root.add_module("level", Box::new(ParamLevel { value: 0.0 }));
    let out = root.add_boundary_output();
    root.connect(param, 0, out, 0).unwrap();
    root.add_messenger("gate", Box::new(Gate { open: false }));

    root.process_block(&config);
    assert!(root.output(0).iter().all(|&s| s == 0.0));

    root.send("gate", Record::new().with("command", "start"), &config);
    root.process_block(&config);
    assert!(root.output(0).iter().all(|&s| s == 1.0));
}

#[test]
fn test_follow_up_messages_are_routed() {
    /// Forwards any payload it receives to another address.
    struct Forwarder;
    impl Module for Forwarder {
        fn num_inputs(&self) -> usize {
            0
        }
        fn num_outputs(&self) -> usize {
            1
        }
        fn synthesize(&mut self, _i: &[Socket], outputs: &mut [Buffer], _c: &AudioConfig) {
            outputs[0].clear();
        }
        fn receive_message(&mut self, payload: &Record, _config: &AudioConfig) -> Vec<Message> {
            vec![Message::new("level", payload.clone())]
        }
    }

    let config = config();
    let mut root = Patch::new("root", &config);
    let forwarder = root.add_module("fwd", Box::new(Forwarder));
    let param = root.add_module("level", Box::new(ParamLevel { value: 0.0 }));
    let out = root.add_boundary_output();
    root.connect(param, 0, out, 0).unwrap();
    root.set_must_synthesize(forwarder, true).unwrap();

    root.send("fwd", Record::new().with("value", 0.125f32), &config);
    root.process_block(&config);
    assert!(root.output(0).iter().all(|&s| s == 0.125));
}

#[test]
fn test_deeply_nested_patches() {
    let config = config();

    let mut inner = scaler_subpatch("inner", &config);
    // scale by 2 inside the innermost patch
    inner.send("filter", Record::new().with("factor", 2.0f32), &config);

    let mut middle = Patch::new("middle", &config);
    let m_in = middle.add_boundary_input();
    let m_nested = middle.add_module("inner", Box::new(inner));
    let m_out = middle.add_boundary_output();
    middle.connect(m_in, 0, m_nested, 0).unwrap();
    middle.connect(m_nested, 0, m_out, 0).unwrap();

    let mut root = Patch::new("root", &config);
    let source = root.add_module("src", Box::new(Level(0.5)));
    let nested = root.add_module("middle", Box::new(middle));
    let out = root.add_boundary_output();
    root.connect(source, 0, nested, 0).unwrap();
    root.connect(nested, 0, out, 0).unwrap();

    root.process_block(&config);
    assert!(root.output(0).iter().all(|&s| s == 1.0));

    // two-level address
    root.send(
        "middle.inner.filter",
        Record::new().with("factor", 4.0f32),
        &config,
    );
    root.process_block(&config);
    assert!(root.output(0).iter().all(|&s| s == 2.0));
}

#[test]
fn test_malformed_payload_is_ignored() {
    let config = config();
    let mut root = Patch::new("root", &config);
    let param = root.add_module("level", Box::new(ParamLevel { value: 0.5 }));
    let out = root.add_boundary_output();
    root.connect(param, 0, out, 0).unwrap();

    // wrong type for "value": checked access fails closed
    root.send(
        "level",
        Record::new().with("value", Value::Str("loud".into())),
        &config,
    );
    root.process_block(&config);
    assert!(root.output(0).iter().all(|&s| s == 0.5));
}
