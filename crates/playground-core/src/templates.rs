//! Template catalog.
//!
//! Templates only seed the editor: selecting one replaces the source text, after which it is
//! an ordinary edit. Catalogs keep insertion order, and the first template is the one a fresh
//! surface starts with.

use crate::compile::Dsl;

/// A named example program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Display name.
    pub name: String,
    /// Initial source text.
    pub source: String,
}

/// An ordered `name → source` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in examples for the dataflow surface syntax.
    pub fn dataflow() -> Self {
        Self::from_static(DATAFLOW_TEMPLATES)
    }

    /// Built-in examples for the Datalog sublanguage.
    pub fn datalog() -> Self {
        Self::from_static(DATALOG_TEMPLATES)
    }

    /// Built-in examples for `dsl`.
    pub fn for_dsl(dsl: Dsl) -> Self {
        match dsl {
            Dsl::Dataflow => Self::dataflow(),
            Dsl::Datalog => Self::datalog(),
        }
    }

    /// Add a template, replacing the source of an existing one with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        let name = name.into();
        let source = source.into();
        match self.templates.iter_mut().find(|t| t.name == name) {
            Some(existing) => existing.source = source,
            None => self.templates.push(Template { name, source }),
        }
    }

    /// The template a new surface starts with.
    pub fn first(&self) -> Option<&Template> {
        self.templates.first()
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Template names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.templates.iter().map(|t| t.name.as_str())
    }

    /// Templates in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> + '_ {
        self.templates.iter()
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    fn from_static(entries: &[(&str, &str)]) -> Self {
        let mut catalog = Self::new();
        for (name, source) in entries {
            catalog.insert(*name, *source);
        }
        catalog
    }
}

const DATAFLOW_TEMPLATES: &[(&str, &str)] = &[
    (
        "Simplest",
        r#"// https://hydro.run/docs/hydroflow/quickstart/example_1_simplest
source_iter(0..10) -> for_each(|n| println!("Hello {}", n));"#,
    ),
    (
        "Simple",
        r#"// https://hydro.run/docs/hydroflow/quickstart/example_2_simple
source_iter(0..10)
  -> map(|n| n * n)
  -> filter(|n| *n > 10)
  -> map(|n| (n..=n+1))
  -> flatten()
  -> for_each(|n| println!("Howdy {}", n));"#,
    ),
    (
        "Chat Server",
        r#"// https://hydro.run/docs/hydroflow/quickstart/example_8_chat_server
// Define shared inbound and outbound channels
outbound_chan = union() -> dest_sink_serde(outbound);
inbound_chan = source_stream_serde(inbound)
    ->  demux(|(msg, addr), var_args!(clients, msgs, errs)|
            match msg {
                Message::ConnectRequest => clients.give(addr),
                Message::ChatMsg {..} => msgs.give(msg),
                _ => errs.give(msg),
            }
        );
clients = inbound_chan[clients] -> tee();
inbound_chan[errs] -> for_each(|m| println!("Received unexpected message type: {:?}", m));
// Pipeline 1: Acknowledge client connections
clients[0] -> map(|addr| (Message::ConnectResponse, addr)) -> [0]outbound_chan;
// Pipeline 2: Broadcast messages to all clients
broadcast = cross_join() -> [1]outbound_chan;
inbound_chan[msgs] -> [0]broadcast;
      clients[1] -> [1]broadcast;"#,
    ),
    (
        "Chat Client",
        r#"// https://hydro.run/docs/hydroflow/quickstart/example_8_chat_server
// set up channels
outbound_chan = union() -> dest_sink_serde(outbound);
inbound_chan = source_stream_serde(inbound) -> map(|(m, _)| m)
    ->  demux(|m, var_args!(acks, msgs, errs)|
            match m {
                Message::ConnectResponse => acks.give(m),
                Message::ChatMsg {..} => msgs.give(m),
                _ => errs.give(m),
            }
        );
inbound_chan[errs] -> for_each(|m| println!("Received unexpected message type: {:?}", m));
// send a single connection request on startup
source_iter([()]) -> map(|_m| (Message::ConnectRequest, server_addr)) -> [0]outbound_chan;
// take stdin and send to server as a msg
// the cross_join serves to buffer msgs until the connection request is acked
msg_send = cross_join() -> map(|(msg, _)| (msg, server_addr)) -> [1]outbound_chan;
lines = source_stdin()
  -> map(|l| Message::ChatMsg {
            nickname: opts.name.clone(),
            message: l.unwrap(),
            ts: Utc::now()})
  -> [0]msg_send;
inbound_chan[acks] -> [1]msg_send;
// receive and print messages
inbound_chan[msgs] -> for_each(pretty_print_msg);"#,
    ),
    (
        "Graph Neighbors",
        r#"// https://hydro.run/docs/hydroflow/quickstart/example_4_neighbors
// inputs: the origin vertex (vertex 0) and stream of input edges
origin = source_iter(vec![0]);
stream_of_edges = source_stream(edges_recv);
// the join
my_join = join() -> flat_map(|(src, (_, dst))| [src, dst]);
origin -> map(|v| (v, ())) -> [0]my_join;
stream_of_edges -> [1]my_join;
// the output
my_join -> unique() -> for_each(|n| println!("Reached: {}", n));"#,
    ),
    (
        "Graph Reachability",
        r#"// https://hydro.run/docs/hydroflow/quickstart/example_5_reachability
// inputs: the origin vertex (vertex 0) and stream of input edges
origin = source_iter(vec![0]);
stream_of_edges = source_stream(edges_recv);
reached_vertices = union();
origin -> [0]reached_vertices;
// the join
my_join_tee = join() -> flat_map(|(src, ((), dst))| [src, dst]) -> tee();
reached_vertices -> map(|v| (v, ())) -> [0]my_join_tee;
stream_of_edges -> [1]my_join_tee;
// the loop and the output
my_join_tee[0] -> [1]reached_vertices;
my_join_tee[1] -> unique() -> for_each(|x| println!("Reached: {}", x));"#,
    ),
    (
        "Graph Un-Reachability",
        r#"// https://hydro.run/docs/hydroflow/quickstart/example_6_unreachability
origin = source_iter(vec![0]);
stream_of_edges = source_stream(pairs_recv) -> tee();
reached_vertices = union()->tee();
origin -> [0]reached_vertices;
// the join for reachable vertices
my_join = join() -> flat_map(|(src, ((), dst))| [src, dst]);
reached_vertices[0] -> map(|v| (v, ())) -> [0]my_join;
stream_of_edges[1] -> [1]my_join;
// the loop
my_join -> [1]reached_vertices;
// the difference all_vertices - reached_vertices
all_vertices = stream_of_edges[0]
  -> flat_map(|(src, dst)| [src, dst]) -> tee();
unreached_vertices = difference();
all_vertices[0] -> [pos]unreached_vertices;
reached_vertices[1] -> [neg]unreached_vertices;
// the output
all_vertices[1] -> unique() -> for_each(|v| println!("Received vertex: {}", v));
unreached_vertices -> for_each(|v| println!("unreached_vertices vertex: {}", v));"#,
    ),
];

const DATALOG_TEMPLATES: &[(&str, &str)] = &[
    (
        "Simplest",
        r#".input foo `null()`
.output bar `null()`
bar(x) :- foo(x)"#,
    ),
    (
        "Graph Reachability",
        r#".input edges `null()`
.input seed_reachable `null()`
.output reachable `null()`
reachable(x) :- seed_reachable(x)
reachable(y) :- reachable(x), edges(x, y)"#,
    ),
];
