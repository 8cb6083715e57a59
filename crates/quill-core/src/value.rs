use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use lasso::{Rodeo, Spur};

use crate::error::Error;

// ── Symbol interning ──────────────────────────────────────────────

thread_local! {
    static INTERNER: RefCell<Rodeo> = RefCell::new(Rodeo::default());
}

/// Intern a string, returning a Spur key.
pub fn intern(s: &str) -> Spur {
    INTERNER.with(|r| r.borrow_mut().get_or_intern(s))
}

/// Resolve a Spur key back to a String.
pub fn resolve(spur: Spur) -> String {
    INTERNER.with(|r| r.borrow().resolve(&spur).to_string())
}

/// Resolve a Spur and call f with the &str, avoiding allocation.
pub fn with_resolved<F, R>(spur: Spur, f: F) -> R
where
    F: FnOnce(&str) -> R,
{
    INTERNER.with(|r| {
        let interner = r.borrow();
        f(interner.resolve(&spur))
    })
}

// ── Type bits ─────────────────────────────────────────────────────

/// One bit per value variant. Signature masks are bitwise ORs of these.
pub mod mask {
    pub const BOOL: u32 = 1 << 0;
    pub const NUMBER: u32 = 1 << 1;
    pub const CHAR: u32 = 1 << 2;
    pub const STRING: u32 = 1 << 3;
    pub const SYMBOL: u32 = 1 << 4;
    pub const NIL: u32 = 1 << 5;
    pub const PAIR: u32 = 1 << 6;
    pub const VECTOR: u32 = 1 << 7;
    pub const PROMISE: u32 = 1 << 8;
    pub const BUILTIN: u32 = 1 << 9;
    pub const SPECIAL_FORM: u32 = 1 << 10;
    pub const LAMBDA: u32 = 1 << 11;

    pub const LIST: u32 = NIL | PAIR;
    pub const ATOM: u32 = BOOL | NUMBER | CHAR | STRING | SYMBOL | NIL;
    pub const CALLABLE: u32 = BUILTIN | SPECIAL_FORM | LAMBDA;
    pub const ANY: u32 = u32::MAX;

    /// Slot sentinel: the rightmost real mask covers every further slot.
    /// Never a legal mask on its own.
    pub const SAME_AS_REST: u32 = 0;

    /// Human-readable name for a mask, used in type-violation messages.
    pub fn describe(m: u32) -> &'static str {
        match m {
            ANY => "any value",
            LIST => "list",
            ATOM => "atom",
            CALLABLE => "procedure",
            BOOL => "boolean",
            NUMBER => "number",
            CHAR => "char",
            STRING => "string",
            SYMBOL => "symbol",
            NIL => "nil",
            PAIR => "pair",
            VECTOR => "vector",
            PROMISE => "promise",
            _ if m & SYMBOL != 0 && m & PAIR != 0 => "symbol or list",
            _ if m & NUMBER != 0 => "number",
            _ => "value of another type",
        }
    }
}

// ── Callable signatures ───────────────────────────────────────────

/// Arity bounds and per-slot type masks carried by every native callable.
/// `max == None` means unbounded. The mask list may end in
/// `mask::SAME_AS_REST`, extending the rightmost real mask over all
/// remaining slots; an empty list (or a leading sentinel) skips type
/// checking entirely.
#[derive(Debug, Clone)]
pub struct Signature {
    pub min: usize,
    pub max: Option<usize>,
    pub masks: Vec<u32>,
}

impl Signature {
    pub fn new(min: usize, max: Option<usize>, masks: &[u32]) -> Self {
        Signature {
            min,
            max,
            masks: masks.to_vec(),
        }
    }

    /// No type constraints, just arity bounds.
    pub fn any(min: usize, max: Option<usize>) -> Self {
        Signature {
            min,
            max,
            masks: Vec::new(),
        }
    }

    /// Check `args` against these bounds and masks. Arity failures come
    /// back as the internal `TooFewArgs`/`TooManyArgs` variants so the
    /// caller can reword them per callable kind.
    pub fn check(&self, name: &str, args: &[Value]) -> Result<(), Error> {
        if args.len() < self.min {
            return Err(Error::TooFewArgs {
                name: name.to_string(),
                min: self.min,
                got: args.len(),
            });
        }
        if let Some(max) = self.max {
            if args.len() > max {
                return Err(Error::TooManyArgs {
                    name: name.to_string(),
                    max,
                    got: args.len(),
                });
            }
        }
        if self.masks.first().map_or(true, |m| *m == mask::SAME_AS_REST) {
            return Ok(());
        }
        let extend = self.masks.last() == Some(&mask::SAME_AS_REST);
        let mut current = self.masks[0];
        for (i, arg) in args.iter().enumerate() {
            match self.masks.get(i) {
                Some(&m) if m != mask::SAME_AS_REST => current = m,
                Some(_) => {}
                // Slots past the mask list are unconstrained unless the
                // list ends in the sentinel.
                None if extend => {}
                None => break,
            }
            if arg.type_mask() & current == 0 {
                return Err(Error::lisp(format!(
                    "{name}: expected {}, got {}",
                    mask::describe(current),
                    arg.type_name()
                )));
            }
        }
        Ok(())
    }
}

// ── Supporting payload types ──────────────────────────────────────

/// A native procedure or special form body.
pub type NativeFnInner = dyn Fn(&[Value], &Env) -> Result<Value, Error>;

pub struct NativeProc {
    pub name: String,
    pub func: Box<NativeFnInner>,
    pub sig: Signature,
}

impl NativeProc {
    pub fn new(
        name: impl Into<String>,
        sig: Signature,
        f: impl Fn(&[Value], &Env) -> Result<Value, Error> + 'static,
    ) -> Self {
        NativeProc {
            name: name.into(),
            func: Box::new(f),
            sig,
        }
    }
}

impl fmt::Debug for NativeProc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<procedure {}>", self.name)
    }
}

/// A cons cell. Lists are chains of pairs ending in Nil; anything else
/// in the cdr position makes the chain improper (printed dotted).
#[derive(Debug, Clone)]
pub struct Pair {
    pub car: Value,
    pub cdr: Value,
}

/// A user-defined lambda with its captured lexical environment.
#[derive(Debug, Clone)]
pub struct Lambda {
    pub params: Vec<Spur>,
    pub body: Vec<Value>,
    pub env: Env,
    pub name: Option<Spur>,
}

/// A delayed computation: expression + captured environment, memoized on
/// first force.
pub struct Promise {
    pub body: Value,
    pub env: Env,
    pub forced: RefCell<Option<Value>>,
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.forced.borrow().is_some() {
            write!(f, "#<promise (forced)>")
        } else {
            write!(f, "#<promise>")
        }
    }
}

// ── The value type ────────────────────────────────────────────────

/// The runtime value: a tagged sum with shared structural ownership.
/// Heap variants hold `Rc` handles; strings and vectors add a `RefCell`
/// because `string-set!` and `vector-set!` write through shared handles.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Char(char),
    String(Rc<RefCell<String>>),
    Symbol(Spur),
    Nil,
    Pair(Rc<Pair>),
    Vector(Rc<RefCell<Vec<Value>>>),
    Promise(Rc<Promise>),
    Builtin(Rc<NativeProc>),
    SpecialForm(Rc<NativeProc>),
    Lambda(Rc<Lambda>),
}

// ── Constructors ──────────────────────────────────────────────────

impl Value {
    pub fn bool(b: bool) -> Value {
        Value::Bool(b)
    }

    pub fn number(n: f64) -> Value {
        Value::Number(n)
    }

    pub fn char(c: char) -> Value {
        Value::Char(c)
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Rc::new(RefCell::new(s.into())))
    }

    pub fn symbol(name: &str) -> Value {
        Value::Symbol(intern(name))
    }

    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Pair(Rc::new(Pair { car, cdr }))
    }

    pub fn vector(items: Vec<Value>) -> Value {
        Value::Vector(Rc::new(RefCell::new(items)))
    }

    pub fn builtin(proc: NativeProc) -> Value {
        Value::Builtin(Rc::new(proc))
    }

    pub fn special_form(proc: NativeProc) -> Value {
        Value::SpecialForm(Rc::new(proc))
    }

    pub fn lambda(l: Lambda) -> Value {
        Value::Lambda(Rc::new(l))
    }

    pub fn promise(p: Promise) -> Value {
        Value::Promise(Rc::new(p))
    }

    /// Build a proper list out of a vector of elements.
    pub fn list_from_vec(items: Vec<Value>) -> Value {
        let mut result = Value::Nil;
        for item in items.into_iter().rev() {
            result = Value::cons(item, result);
        }
        result
    }
}

// ── Accessors and classification ──────────────────────────────────

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Nil => "nil",
            Value::Pair(_) => "pair",
            Value::Vector(_) => "vector",
            Value::Promise(_) => "promise",
            Value::Builtin(_) => "procedure",
            Value::SpecialForm(_) => "special form",
            Value::Lambda(_) => "procedure",
        }
    }

    pub fn type_mask(&self) -> u32 {
        match self {
            Value::Bool(_) => mask::BOOL,
            Value::Number(_) => mask::NUMBER,
            Value::Char(_) => mask::CHAR,
            Value::String(_) => mask::STRING,
            Value::Symbol(_) => mask::SYMBOL,
            Value::Nil => mask::NIL,
            Value::Pair(_) => mask::PAIR,
            Value::Vector(_) => mask::VECTOR,
            Value::Promise(_) => mask::PROMISE,
            Value::Builtin(_) => mask::BUILTIN,
            Value::SpecialForm(_) => mask::SPECIAL_FORM,
            Value::Lambda(_) => mask::LAMBDA,
        }
    }

    /// Only #f is falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// A proper list: nil, or a pair chain ending in nil.
    pub fn is_list(&self) -> bool {
        let mut cursor = self.clone();
        loop {
            match cursor {
                Value::Nil => return true,
                Value::Pair(p) => cursor = p.cdr.clone(),
                _ => return false,
            }
        }
    }

    pub fn is_callable(&self) -> bool {
        self.type_mask() & mask::CALLABLE != 0
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integer-ness is a predicate on the float.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.trunc() == *n => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_symbol_spur(&self) -> Option<Spur> {
        match self {
            Value::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<String> {
        self.as_symbol_spur().map(resolve)
    }

    pub fn as_string_rc(&self) -> Option<Rc<RefCell<String>>> {
        match self {
            Value::String(s) => Some(Rc::clone(s)),
            _ => None,
        }
    }

    pub fn as_vector_rc(&self) -> Option<Rc<RefCell<Vec<Value>>>> {
        match self {
            Value::Vector(v) => Some(Rc::clone(v)),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<Rc<Pair>> {
        match self {
            Value::Pair(p) => Some(Rc::clone(p)),
            _ => None,
        }
    }

    /// Flatten a proper list into a vector of element handles.
    /// Returns None for improper chains and non-lists.
    pub fn list_to_vec(&self) -> Option<Vec<Value>> {
        let mut items = Vec::new();
        let mut cursor = self.clone();
        loop {
            match cursor {
                Value::Nil => return Some(items),
                Value::Pair(p) => {
                    items.push(p.car.clone());
                    cursor = p.cdr.clone();
                }
                _ => return None,
            }
        }
    }

    /// Copy the top-level cell: strings and vectors get a fresh payload,
    /// pairs a fresh cell sharing car and cdr. Immediates and callables
    /// just clone the handle.
    pub fn copy(&self) -> Value {
        match self {
            Value::String(s) => Value::string(s.borrow().clone()),
            Value::Vector(v) => Value::vector(v.borrow().clone()),
            Value::Pair(p) => Value::cons(p.car.clone(), p.cdr.clone()),
            other => other.clone(),
        }
    }

    /// eq? semantics: value comparison for small atoms and procedures,
    /// handle identity for everything else.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Builtin(a), Value::Builtin(b)) => Rc::ptr_eq(a, b),
            (Value::SpecialForm(a), Value::SpecialForm(b)) => Rc::ptr_eq(a, b),
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b),
            (Value::Vector(a), Value::Vector(b)) => Rc::ptr_eq(a, b),
            (Value::Promise(a), Value::Promise(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ── Structural equality (equal?) ──────────────────────────────────

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::String(a), Value::String(b)) => *a.borrow() == *b.borrow(),
            (Value::Pair(a), Value::Pair(b)) => a.car == b.car && a.cdr == b.cdr,
            (Value::Vector(a), Value::Vector(b)) => *a.borrow() == *b.borrow(),
            (Value::Promise(a), Value::Promise(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Rc::ptr_eq(a, b),
            (Value::SpecialForm(a), Value::SpecialForm(b)) => Rc::ptr_eq(a, b),
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ── Print and display forms ───────────────────────────────────────

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, raw: bool) -> fmt::Result {
    match value {
        Value::Bool(true) => write!(f, "#t"),
        Value::Bool(false) => write!(f, "#f"),
        Value::Number(n) => {
            if n.trunc() == *n && n.abs() < 1e15 {
                write!(f, "{}", *n as i64)
            } else {
                write!(f, "{n}")
            }
        }
        Value::Char(c) if raw => write!(f, "{c}"),
        Value::Char(c) => match c {
            ' ' => write!(f, "#\\space"),
            '\n' => write!(f, "#\\newline"),
            _ => write!(f, "#\\{c}"),
        },
        Value::String(s) if raw => write!(f, "{}", s.borrow()),
        Value::String(s) => {
            write!(f, "\"")?;
            for c in s.borrow().chars() {
                match c {
                    '\\' => write!(f, "\\\\")?,
                    '"' => write!(f, "\\\"")?,
                    '\n' => write!(f, "\\n")?,
                    _ => write!(f, "{c}")?,
                }
            }
            write!(f, "\"")
        }
        Value::Symbol(s) => with_resolved(*s, |name| write!(f, "{name}")),
        Value::Nil => write!(f, "()"),
        Value::Pair(p) => {
            write!(f, "(")?;
            write_value(f, &p.car, raw)?;
            let mut cursor = p.cdr.clone();
            loop {
                match cursor {
                    Value::Nil => break,
                    Value::Pair(next) => {
                        write!(f, " ")?;
                        write_value(f, &next.car, raw)?;
                        cursor = next.cdr.clone();
                    }
                    tail => {
                        write!(f, " . ")?;
                        write_value(f, &tail, raw)?;
                        break;
                    }
                }
            }
            write!(f, ")")
        }
        Value::Vector(items) => {
            write!(f, "#(")?;
            for (i, item) in items.borrow().iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write_value(f, item, raw)?;
            }
            write!(f, ")")
        }
        Value::Promise(p) => {
            if p.forced.borrow().is_some() {
                write!(f, "#<promise (forced)>")
            } else {
                write!(f, "#<promise>")
            }
        }
        Value::Builtin(p) | Value::SpecialForm(p) => write!(f, "#<procedure {}>", p.name),
        Value::Lambda(l) => match l.name {
            Some(name) => with_resolved(name, |n| write!(f, "#<procedure {n}>")),
            None => write!(f, "#<procedure>"),
        },
    }
}

/// The print form: strings quoted and escaped, chars as #\name.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, false)
    }
}

struct DisplayForm<'a>(&'a Value);

impl fmt::Display for DisplayForm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self.0, true)
    }
}

impl Value {
    /// The display form: strings and chars as raw glyphs.
    pub fn display_string(&self) -> String {
        format!("{}", DisplayForm(self))
    }
}

// ── Environments ──────────────────────────────────────────────────

/// A binding frame with an optional lexical parent. Frames are shared:
/// cloning an Env clones the handle, not the bindings.
#[derive(Debug, Clone)]
pub struct Env {
    pub bindings: Rc<RefCell<HashMap<Spur, Value>>>,
    pub parent: Option<Rc<Env>>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            bindings: Rc::new(RefCell::new(HashMap::new())),
            parent: None,
        }
    }

    pub fn with_parent(parent: Rc<Env>) -> Self {
        Env {
            bindings: Rc::new(RefCell::new(HashMap::new())),
            parent: Some(parent),
        }
    }

    /// Bind or rebind in this frame only.
    pub fn define(&self, name: Spur, val: Value) {
        self.bindings.borrow_mut().insert(name, val);
    }

    pub fn define_str(&self, name: &str, val: Value) {
        self.define(intern(name), val);
    }

    /// Remove a binding from this frame only.
    pub fn undefine(&self, name: Spur) -> Option<Value> {
        self.bindings.borrow_mut().remove(&name)
    }

    /// Walk the chain to the first binding.
    pub fn lookup(&self, name: Spur) -> Option<Value> {
        if let Some(val) = self.bindings.borrow().get(&name) {
            Some(val.clone())
        } else if let Some(parent) = &self.parent {
            parent.lookup(name)
        } else {
            None
        }
    }

    pub fn lookup_str(&self, name: &str) -> Option<Value> {
        self.lookup(intern(name))
    }

    /// Update the frame that already binds `name` (set! semantics).
    /// Returns false when no frame in the chain binds it.
    pub fn assign(&self, name: Spur, val: Value) -> bool {
        let mut bindings = self.bindings.borrow_mut();
        if let Some(entry) = bindings.get_mut(&name) {
            *entry = val;
            true
        } else {
            drop(bindings);
            match &self.parent {
                Some(parent) => parent.assign(name, val),
                None => false,
            }
        }
    }

    /// A fresh child frame extending this one.
    pub fn child(&self) -> Env {
        Env::with_parent(Rc::new(self.clone()))
    }

    /// A child frame with names[i] bound to values[i].
    pub fn create_child(&self, names: &[Spur], values: &[Value]) -> Env {
        let child = self.child();
        for (name, val) in names.iter().zip(values.iter()) {
            child.define(*name, val.clone());
        }
        child
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────
