//! # Scope 模块
//!
//! 作用域链：实现词法作用域和闭包捕获。
//!
//! ## 内存模型
//!
//! 作用域以 `Rc<RefCell<_>>` 共享：当前求值位置、子作用域、以及捕获它的
//! 函数值都持有同一个作用域。作用域的生命周期等于最后一个持有者的生命周期，
//! 因此可以比创建它的那次调用活得更久。
//!
//! 函数声明会把函数存进它自己的闭包作用域，形成引用环：
//!
//! ```text
//! scope ──variables──► Function ──closure──► scope
//! ```
//!
//! 只靠引用计数的话，每次调用中只要声明了函数，这次调用的作用域就永远不会
//! 被释放。[`ScopeHeap`] 记录解释器创建的所有作用域，并用试删除
//! （trial deletion）回收不可达的环：
//!
//! 1. 统计每个作用域被其他受管作用域引用的次数（父链接 + 闭包）
//! 2. 强引用数多于内部引用数的作用域被外部持有，作为根
//! 3. 从根出发标记可达的作用域
//! 4. 清空其余作用域的绑定，环断开后由引用计数释放

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::value::Value;

/// 单个作用域
#[derive(Default)]
struct Scope {
    /// 变量绑定
    variables: HashMap<String, Value>,
    /// 父作用域，只有根作用域为 None
    parent: Option<ScopeRef>,
}

/// 赋值落点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// 更新了链上已有的绑定
    Updated,
    /// 链上没有该名字，在根作用域中新建了绑定
    CreatedInRoot,
}

/// 作用域句柄
///
/// clone 只增加引用计数，所有 clone 指向同一个作用域。
#[derive(Clone)]
pub struct ScopeRef(Rc<RefCell<Scope>>);

impl ScopeRef {
    /// 创建根作用域
    pub fn root() -> Self {
        ScopeRef(Rc::new(RefCell::new(Scope::default())))
    }

    /// 创建以 `self` 为父的子作用域
    pub fn child(&self) -> Self {
        ScopeRef(Rc::new(RefCell::new(Scope {
            variables: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// 父作用域
    pub fn parent(&self) -> Option<ScopeRef> {
        self.0.borrow().parent.clone()
    }

    pub fn is_root(&self) -> bool {
        self.0.borrow().parent.is_none()
    }

    /// 作用域链长度（根作用域为 1）
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.parent();
        while let Some(scope) = current {
            depth += 1;
            current = scope.parent();
        }
        depth
    }

    /// 是否与另一个句柄指向同一个作用域
    pub fn ptr_eq(&self, other: &ScopeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// 在本作用域中声明变量，初始为 Nil
    ///
    /// 无条件覆盖本作用域中的同名绑定，不影响外层作用域。
    pub fn declare(&self, name: &str) {
        self.define(name, Value::Nil);
    }

    /// 在本作用域中直接绑定变量
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().variables.insert(name.into(), value);
    }

    /// 本作用域（不含外层）是否绑定了该名字
    pub fn has_own(&self, name: &str) -> bool {
        self.0.borrow().variables.contains_key(name)
    }

    /// 沿作用域链由内向外查找变量
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let parent = {
                let scope = current.0.borrow();
                if let Some(value) = scope.variables.get(name) {
                    return Some(value.clone());
                }
                scope.parent.clone()?
            };
            current = parent;
        }
    }

    /// 作用域链上是否存在该名字
    pub fn contains(&self, name: &str) -> bool {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            if scope.has_own(name) {
                return true;
            }
            current = scope.parent();
        }
        false
    }

    /// 沿作用域链由内向外赋值
    ///
    /// 第一个已绑定该名字的作用域接收新值；若一直找到根作用域都没有，
    /// 则在根作用域中新建绑定。
    pub fn assign(&self, name: &str, value: Value) -> Assignment {
        let mut current = self.clone();
        loop {
            let parent = {
                let mut scope = current.0.borrow_mut();
                if let Some(slot) = scope.variables.get_mut(name) {
                    *slot = value;
                    return Assignment::Updated;
                }
                match scope.parent.clone() {
                    Some(parent) => parent,
                    None => {
                        scope.variables.insert(name.to_string(), value);
                        return Assignment::CreatedInRoot;
                    }
                }
            };
            current = parent;
        }
    }

    /// 创建不持有作用域的弱引用
    pub fn downgrade(&self) -> WeakScope {
        WeakScope(Rc::downgrade(&self.0))
    }

    /// 本作用域中的变量名（排序后）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.borrow().variables.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Scope {
    /// 本作用域直接强引用的其他作用域：父作用域和函数值的闭包
    fn edges(&self) -> impl Iterator<Item = &Rc<RefCell<Scope>>> {
        let closures = self
            .variables
            .values()
            .filter_map(Value::as_function)
            .map(|function| &function.closure.0);
        self.parent.iter().map(|parent| &parent.0).chain(closures)
    }
}

/// 作用域弱引用
#[derive(Clone, Debug)]
pub struct WeakScope(Weak<RefCell<Scope>>);

impl WeakScope {
    /// 作用域是否仍然存活
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn upgrade(&self) -> Option<ScopeRef> {
        self.0.upgrade().map(ScopeRef)
    }
}

/// 受管作用域集合
///
/// 解释器创建的作用域都在这里登记，以便回收引用环。
/// 不在这里登记的作用域对它引用的受管作用域视为外部持有者，不会被误回收。
#[derive(Debug, Default)]
pub struct ScopeHeap {
    scopes: RefCell<Vec<WeakScope>>,
    /// 上次回收之后新登记的作用域数
    allocated_since_collect: Cell<usize>,
}

impl ScopeHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建并登记根作用域
    pub fn root(&self) -> ScopeRef {
        self.register(ScopeRef::root())
    }

    /// 创建并登记以 `parent` 为父的子作用域
    pub fn child_of(&self, parent: &ScopeRef) -> ScopeRef {
        self.register(parent.child())
    }

    fn register(&self, scope: ScopeRef) -> ScopeRef {
        self.scopes.borrow_mut().push(scope.downgrade());
        self.allocated_since_collect
            .set(self.allocated_since_collect.get() + 1);
        scope
    }

    /// 仍然存活的受管作用域数量
    pub fn live_count(&self) -> usize {
        self.scopes.borrow().iter().filter(|scope| scope.is_alive()).count()
    }

    /// 上次回收之后新登记的作用域数
    pub fn allocated_since_collect(&self) -> usize {
        self.allocated_since_collect.get()
    }

    /// 回收不可达的作用域环，返回被回收的作用域数
    ///
    /// 必须在没有作用域被借用时调用（即不在求值过程中）。
    pub fn collect(&self) -> usize {
        self.allocated_since_collect.set(0);

        let live: Vec<Rc<RefCell<Scope>>> = {
            let mut scopes = self.scopes.borrow_mut();
            scopes.retain(WeakScope::is_alive);
            scopes.iter().filter_map(|scope| scope.0.upgrade()).collect()
        };
        let index: HashMap<*const RefCell<Scope>, usize> = live
            .iter()
            .enumerate()
            .map(|(i, scope)| (Rc::as_ptr(scope), i))
            .collect();

        let successors: Vec<Vec<usize>> = live
            .iter()
            .map(|scope| {
                scope
                    .borrow()
                    .edges()
                    .filter_map(|target| index.get(&Rc::as_ptr(target)).copied())
                    .collect()
            })
            .collect();

        let mut internal = vec![0usize; live.len()];
        for targets in &successors {
            for &target in targets {
                internal[target] += 1;
            }
        }

        // `live` 自身为每个作用域多持有一个强引用
        let mut reachable = vec![false; live.len()];
        let mut stack: Vec<usize> = (0..live.len())
            .filter(|&i| Rc::strong_count(&live[i]) - 1 > internal[i])
            .collect();
        while let Some(i) = stack.pop() {
            if reachable[i] {
                continue;
            }
            reachable[i] = true;
            stack.extend(successors[i].iter().copied().filter(|&j| !reachable[j]));
        }

        // 先把绑定全部取出再统一释放，释放过程中不持有任何借用
        let garbage: Vec<HashMap<String, Value>> = live
            .iter()
            .zip(&reachable)
            .filter(|(_, reachable)| !**reachable)
            .map(|(scope, _)| std::mem::take(&mut scope.borrow_mut().variables))
            .collect();
        let collected = garbage.len();
        drop(garbage);
        drop(live);

        self.scopes.borrow_mut().retain(WeakScope::is_alive);
        if collected > 0 {
            debug!(collected, "回收作用域环");
        }
        collected
    }
}

impl fmt::Debug for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("names", &self.names())
            .field("depth", &self.depth())
            .finish()
    }
}
