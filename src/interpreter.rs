//! Interpreter for executing ESTree programs
//!
//! A direct recursive tree walk. Statements consult the control-flow
//! register between children; expressions build references and evaluate
//! through the operator tables; member assignments and method calls with a
//! receiver pass through the checker hook. The host context object is
//! shared with the executing script and never shadowed.

use std::mem;
use std::rc::Rc;

use crate::ast::{
    Block, CatchClause, Expression, ForInLeft, ForInit, FunctionDecl, Identifier, LiteralValue,
    Program, RegexLiteral, Statement, SwitchCase, VariableDecl, VariableKind,
};
use crate::checker::{CheckRequest, CheckStatus, Checker, Collection};
use crate::codegen;
use crate::error::JsError;
use crate::flow::FlowState;
use crate::hoist;
use crate::host;
use crate::ops::OperatorTables;
use crate::reference::{CallTarget, Place, SiteInfo};
use crate::scope::ClosureStack;
use crate::value::{
    create_array, create_function, create_object, ExoticObject, FunctionAgent, HostClass,
    JsFunction, JsObject, JsObjectRef, JsString, JsValue, NativeFunction, PropertyKey,
};

/// The interpreter state
pub struct Interpreter {
    /// The host global the script runs against
    context: JsValue,
    /// URL of the script currently executing
    script_url: JsString,
    /// The live lexical environment
    scopes: ClosureStack,
    /// Control-flow signal register
    flow: FlowState,
    /// Operator implementations
    ops: OperatorTables,
    /// Call-site classifier, if installed
    checker: Option<Rc<dyn Checker>>,
    /// Recorded operations
    collection: Collection,
    /// Suppresses checker bookkeeping while a flagged call is running
    check_flag: bool,
}

impl Interpreter {
    /// Create an interpreter over an empty host context
    pub fn new() -> Self {
        Self::with_context(create_object())
    }

    /// Create an interpreter over the given host context object
    pub fn with_context(context: JsObjectRef) -> Self {
        Self {
            context: JsValue::Object(context),
            script_url: "".into(),
            scopes: ClosureStack::new(),
            flow: FlowState::new(),
            ops: OperatorTables::default(),
            checker: None,
            collection: Collection::new(),
            check_flag: false,
        }
    }

    pub fn set_checker(&mut self, checker: Rc<dyn Checker>) {
        self.checker = Some(checker);
    }

    /// Replace the operator tables
    pub fn set_operators(&mut self, ops: OperatorTables) {
        self.ops = ops;
    }

    pub fn context(&self) -> &JsValue {
        &self.context
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn take_collection(&mut self) -> Collection {
        mem::take(&mut self.collection)
    }

    /// True when no control-flow signal is pending and no checker hit is
    /// in flight
    pub fn is_idle(&self) -> bool {
        self.flow.is_idle() && !self.check_flag
    }

    /// Execute a program under the given script URL.
    ///
    /// The root statement list is hoisted into the outermost frame, then
    /// run. The value of the last completed statement is returned; pending
    /// control-flow signals are dropped at this boundary.
    pub fn execute(&mut self, program: &Program, script_url: &str) -> Result<JsValue, JsError> {
        tracing::debug!(script_url, statements = program.body.len(), "executing program");
        self.script_url = script_url.into();
        self.scopes.define("this", self.context.clone());
        for name in hoist::hoisted_names(&program.body) {
            self.scopes.define(name, JsValue::Undefined);
        }
        let result = self.run_statements(&program.body);
        self.flow.reset();
        result
    }

    // ============ STATEMENTS ============

    /// Run a statement list: function declarations first, then the rest in
    /// order, stopping as soon as a control-flow signal is raised
    fn run_statements(&mut self, stmts: &[Statement]) -> Result<JsValue, JsError> {
        for stmt in stmts {
            if let Statement::FunctionDeclaration(decl) = stmt {
                self.declare_function(decl)?;
            }
        }
        let mut result = JsValue::Undefined;
        for stmt in stmts {
            if matches!(stmt, Statement::FunctionDeclaration(_)) {
                continue;
            }
            result = self.execute_statement(stmt, None)?;
            if self.flow.interrupted() {
                break;
            }
        }
        Ok(result)
    }

    /// Execute a statement. `label` carries the name of an immediately
    /// enclosing labelled statement down to the loop evaluators.
    fn execute_statement(
        &mut self,
        stmt: &Statement,
        label: Option<&str>,
    ) -> Result<JsValue, JsError> {
        match stmt {
            Statement::ExpressionStatement { expression } => self.evaluate(expression),

            Statement::BlockStatement { body } => self.run_statements(body),

            Statement::EmptyStatement => Ok(JsValue::Undefined),

            Statement::VariableDeclaration(decl) => {
                self.execute_variable_declaration(decl)?;
                Ok(JsValue::Undefined)
            }

            Statement::FunctionDeclaration(decl) => {
                self.declare_function(decl)?;
                Ok(JsValue::Undefined)
            }

            Statement::ReturnStatement { argument } => {
                // The argument may itself contain a call whose exit clears
                // the return signal, so it runs first.
                let value = match argument {
                    Some(arg) => self.evaluate(arg)?,
                    None => JsValue::Undefined,
                };
                self.flow.set_return();
                Ok(value)
            }

            Statement::BreakStatement { label } => {
                self.flow
                    .set_break(label.as_ref().map(|l| l.name.as_str().into()));
                Ok(JsValue::Undefined)
            }

            Statement::ContinueStatement { label } => {
                self.flow
                    .set_continue(label.as_ref().map(|l| l.name.as_str().into()));
                Ok(JsValue::Undefined)
            }

            Statement::LabeledStatement { label, body } => {
                let value = self.execute_statement(body, Some(&label.name))?;
                self.flow.consume_labeled_break(&label.name);
                Ok(value)
            }

            Statement::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                if self.evaluate(test)?.to_boolean() {
                    self.execute_statement(consequent, None)
                } else if let Some(alt) = alternate {
                    self.execute_statement(alt, None)
                } else {
                    Ok(JsValue::Undefined)
                }
            }

            Statement::WhileStatement { test, body } => self.execute_while(test, body, label),

            Statement::DoWhileStatement { body, test } => {
                let mut last;
                loop {
                    last = self.execute_statement(body, None)?;
                    if self.flow.loop_should_break(label) {
                        break;
                    }
                    if !self.evaluate(test)?.to_boolean() {
                        break;
                    }
                }
                Ok(last)
            }

            Statement::ForStatement {
                init,
                test,
                update,
                body,
            } => self.execute_for(init.as_ref(), test.as_ref(), update.as_ref(), body, label),

            Statement::ForInStatement { left, right, body } => {
                self.execute_for_in(left, right, body, label)
            }

            Statement::SwitchStatement {
                discriminant,
                cases,
            } => self.execute_switch(discriminant, cases),

            Statement::ThrowStatement { argument } => {
                let value = self.evaluate(argument)?;
                Err(JsError::thrown(value))
            }

            Statement::TryStatement {
                block,
                handler,
                finalizer,
            } => self.execute_try(block, handler.as_ref(), finalizer.as_ref()),
        }
    }

    fn execute_variable_declaration(&mut self, decl: &VariableDecl) -> Result<(), JsError> {
        for declarator in &decl.declarations {
            if decl.kind == VariableKind::Var && declarator.init.is_none() {
                // Already installed as undefined by the hoist pass
                continue;
            }
            let value = match &declarator.init {
                Some(init) => self.evaluate(init)?,
                None => JsValue::Undefined,
            };
            self.scopes.define(declarator.id.name.as_str(), value);
        }
        Ok(())
    }

    fn declare_function(&mut self, decl: &FunctionDecl) -> Result<(), JsError> {
        let func = self.make_function(Some(&decl.id), &decl.params, &decl.body)?;
        self.scopes.define(decl.id.name.as_str(), func);
        Ok(())
    }

    fn execute_while(
        &mut self,
        test: &Expression,
        body: &Statement,
        label: Option<&str>,
    ) -> Result<JsValue, JsError> {
        let mut last = JsValue::Undefined;
        while self.evaluate(test)?.to_boolean() {
            last = self.execute_statement(body, None)?;
            if self.flow.loop_should_break(label) {
                break;
            }
        }
        Ok(last)
    }

    fn execute_for(
        &mut self,
        init: Option<&ForInit>,
        test: Option<&Expression>,
        update: Option<&Expression>,
        body: &Statement,
        label: Option<&str>,
    ) -> Result<JsValue, JsError> {
        match init {
            Some(ForInit::Declaration(decl)) => self.execute_variable_declaration(decl)?,
            Some(ForInit::Expression(expr)) => {
                self.evaluate(expr)?;
            }
            None => {}
        }
        let mut last = JsValue::Undefined;
        loop {
            if let Some(test) = test {
                if !self.evaluate(test)?.to_boolean() {
                    break;
                }
            }
            last = self.execute_statement(body, None)?;
            if self.flow.loop_should_break(label) {
                break;
            }
            if let Some(update) = update {
                self.evaluate(update)?;
            }
        }
        Ok(last)
    }

    fn execute_for_in(
        &mut self,
        left: &ForInLeft,
        right: &Expression,
        body: &Statement,
        label: Option<&str>,
    ) -> Result<JsValue, JsError> {
        let value = self.evaluate(right)?;
        let name = left
            .name()
            .ok_or_else(|| JsError::structural("for-in needs a single iteration variable"))?
            .to_string();
        let keys = match &value {
            JsValue::Object(obj) => obj.borrow().own_enumerable_keys(),
            _ => Vec::new(),
        };
        let mut last = JsValue::Undefined;
        for key in keys {
            self.scopes
                .update(&name, JsValue::String(key.to_js_string()));
            last = self.execute_statement(body, None)?;
            if self.flow.loop_should_break(label) {
                break;
            }
        }
        Ok(last)
    }

    fn execute_switch(
        &mut self,
        discriminant: &Expression,
        cases: &[SwitchCase],
    ) -> Result<JsValue, JsError> {
        let value = self.evaluate(discriminant)?;
        let mut matched = None;
        for (index, case) in cases.iter().enumerate() {
            match &case.test {
                None => {
                    matched = Some(index);
                    break;
                }
                Some(test) => {
                    if self.evaluate(test)?.strict_equals(&value) {
                        matched = Some(index);
                        break;
                    }
                }
            }
        }
        let mut last = JsValue::Undefined;
        if let Some(start) = matched {
            // The tail of the case list runs as one statement sequence, so
            // cases without a break fall through.
            let tail: Vec<Statement> = cases[start..]
                .iter()
                .flat_map(|case| case.consequent.iter().cloned())
                .collect();
            last = self.run_statements(&tail)?;
        }
        self.flow.finish_switch();
        Ok(last)
    }

    fn execute_try(
        &mut self,
        block: &Block,
        handler: Option<&CatchClause>,
        finalizer: Option<&Block>,
    ) -> Result<JsValue, JsError> {
        let mut remembered: Option<JsValue> = None;
        let mut pending: Option<JsError> = None;

        match self.run_statements(&block.body) {
            Ok(value) => {
                if self.flow.has_return() {
                    self.flow.clear_return();
                    remembered = Some(value);
                }
            }
            Err(JsError::Thrown { value }) if handler.is_some() => {
                let clause = handler.expect("checked above");
                self.scopes.define(clause.param.name.as_str(), value);
                match self.run_statements(&clause.body.body) {
                    Ok(value) => {
                        if self.flow.has_return() {
                            self.flow.clear_return();
                            remembered = Some(value);
                        }
                    }
                    Err(err) => pending = Some(err),
                }
            }
            Err(err) => pending = Some(err),
        }

        if let Some(fin) = finalizer {
            let value = self.run_statements(&fin.body)?;
            if self.flow.has_return() {
                self.flow.clear_return();
                remembered = Some(value);
            }
        }

        if let Some(value) = remembered {
            self.flow.set_return();
            Ok(value)
        } else if let Some(err) = pending {
            Err(err)
        } else {
            Ok(JsValue::Undefined)
        }
    }

    // ============ EXPRESSIONS ============

    /// Evaluate an expression to a value
    pub fn evaluate(&mut self, expr: &Expression) -> Result<JsValue, JsError> {
        match expr {
            Expression::Literal { value, regex, .. } => {
                Ok(self.evaluate_literal(value, regex.as_ref()))
            }

            Expression::Identifier { name } => Ok(self.lookup_identifier(name)),

            Expression::ThisExpression => {
                Ok(self.scopes.get("this").unwrap_or(JsValue::Undefined))
            }

            Expression::ArrayExpression { elements } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(match element {
                        Some(e) => self.evaluate(e)?,
                        None => JsValue::Undefined,
                    });
                }
                Ok(JsValue::Object(create_array(values)))
            }

            Expression::ObjectExpression { properties } => {
                let result = create_object();
                for prop in properties {
                    let key = self.property_key(&prop.key, prop.computed)?;
                    let value = self.evaluate(&prop.value)?;
                    result.borrow_mut().set_property(key, value);
                }
                Ok(JsValue::Object(result))
            }

            Expression::FunctionExpression(func) => {
                self.make_function(func.id.as_ref(), &func.params, &func.body)
            }

            Expression::UnaryExpression { operator, argument } => {
                self.evaluate_unary(operator, argument)
            }

            Expression::UpdateExpression {
                operator,
                argument,
                prefix,
            } => self.evaluate_update(operator, argument, *prefix),

            Expression::BinaryExpression {
                operator,
                left,
                right,
            } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                let op = self.ops.binary.get(operator.as_str()).copied().ok_or_else(|| {
                    JsError::structural(format!("unknown binary operator '{}'", operator))
                })?;
                op(&l, &r)
            }

            Expression::LogicalExpression {
                operator,
                left,
                right,
            } => {
                let op = self.ops.logical.get(operator.as_str()).copied().ok_or_else(|| {
                    JsError::structural(format!("unknown logical operator '{}'", operator))
                })?;
                op(self, left, right)
            }

            Expression::AssignmentExpression {
                operator,
                left,
                right,
            } => self.evaluate_assignment(operator, left, right, expr),

            Expression::MemberExpression {
                object,
                property,
                computed,
            } => {
                let object = self.evaluate(object)?;
                let key = self.property_key(property, *computed)?;
                Ok(self.member_read(&object, &key))
            }

            Expression::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                if self.evaluate(test)?.to_boolean() {
                    self.evaluate(consequent)
                } else {
                    self.evaluate(alternate)
                }
            }

            Expression::CallExpression { callee, arguments } => {
                self.evaluate_call(callee, arguments, expr)
            }

            Expression::NewExpression { callee, arguments } => {
                self.evaluate_new(callee, arguments)
            }

            Expression::SequenceExpression { expressions } => {
                let mut result = JsValue::Undefined;
                for e in expressions {
                    result = self.evaluate(e)?;
                }
                Ok(result)
            }
        }
    }

    fn evaluate_literal(&self, value: &LiteralValue, regex: Option<&RegexLiteral>) -> JsValue {
        if let Some(r) = regex {
            let mut obj = JsObject::new();
            obj.exotic = ExoticObject::Regex {
                pattern: r.pattern.clone(),
                flags: r.flags.clone(),
            };
            obj.set_property(PropertyKey::from("source"), JsValue::from(r.pattern.as_str()));
            obj.set_property(PropertyKey::from("flags"), JsValue::from(r.flags.as_str()));
            return JsValue::Object(Rc::new(std::cell::RefCell::new(obj)));
        }
        match value {
            LiteralValue::Null => JsValue::Null,
            LiteralValue::Boolean(b) => JsValue::Boolean(*b),
            LiteralValue::Number(n) => JsValue::Number(*n),
            LiteralValue::String(s) => JsValue::from(s.as_str()),
            LiteralValue::Opaque(_) => JsValue::Null,
        }
    }

    /// Identifier resolution. Some producers encode `null` and `undefined`
    /// as identifiers rather than keywords. Names defined in no frame fall
    /// back to the host context, then to undefined.
    fn lookup_identifier(&self, name: &str) -> JsValue {
        match name {
            "undefined" => JsValue::Undefined,
            "null" => JsValue::Null,
            _ => self
                .scopes
                .get(name)
                .or_else(|| {
                    self.context
                        .as_object()
                        .and_then(|ctx| ctx.borrow().get_property(&PropertyKey::from(name)))
                })
                .unwrap_or(JsValue::Undefined),
        }
    }

    /// The key of a member access or object-literal property
    fn property_key(
        &mut self,
        property: &Expression,
        computed: bool,
    ) -> Result<PropertyKey, JsError> {
        if computed {
            let value = self.evaluate(property)?;
            return Ok(PropertyKey::from_value(&value));
        }
        match property {
            Expression::Identifier { name } => Ok(PropertyKey::from(name.as_str())),
            Expression::Literal { value, regex, .. } => {
                let value = self.evaluate_literal(value, regex.as_ref());
                Ok(PropertyKey::from_value(&value))
            }
            _ => Err(JsError::structural("unsupported property key")),
        }
    }

    /// A member read. Style declarations and token lists learn their
    /// owning object through a `parent` property on first read, so a later
    /// write through them can be attributed to the element they belong to.
    fn member_read(&mut self, object: &JsValue, key: &PropertyKey) -> JsValue {
        let result = match object {
            JsValue::Object(obj) => obj
                .borrow()
                .get_property(key)
                .unwrap_or(JsValue::Undefined),
            JsValue::String(s) if key.as_str() == Some("length") => {
                JsValue::Number(s.chars().count() as f64)
            }
            _ => JsValue::Undefined,
        };
        if let JsValue::Object(found) = &result {
            let needs_parent = {
                let borrowed = found.borrow();
                matches!(
                    borrowed.exotic,
                    ExoticObject::Host(
                        HostClass::CssStyleDeclaration | HostClass::DomTokenList
                    )
                ) && !borrowed.has_own_property(&PropertyKey::from("parent"))
            };
            if needs_parent {
                found
                    .borrow_mut()
                    .set_property(PropertyKey::from("parent"), object.clone());
            }
        }
        result
    }

    // ============ REFERENCES ============

    /// Convert an expression into a writable place
    fn resolve_place(&mut self, expr: &Expression) -> Result<Place, JsError> {
        match expr {
            Expression::MemberExpression {
                object,
                property,
                computed,
            } => {
                let object = self.evaluate(object)?;
                let key = self.property_key(property, *computed)?;
                Ok(Place::Member { object, key })
            }
            Expression::Identifier { name } => Ok(Place::Var(name.as_str().into())),
            _ => Err(JsError::structural(
                "expression is not a valid assignment target",
            )),
        }
    }

    fn read_place(&mut self, place: &Place) -> JsValue {
        match place {
            Place::Var(name) => self.lookup_identifier(name),
            Place::Member { object, key } => self.member_read(object, key),
        }
    }

    /// The `=` operation: variables update through the closure stack,
    /// members assign on their receiver. Member writes pass through the
    /// checker hook.
    fn write_place(
        &mut self,
        place: &Place,
        value: JsValue,
        info: &Option<SiteInfo>,
    ) -> Result<(), JsError> {
        match place {
            Place::Var(name) => {
                self.scopes.update(name, value);
                Ok(())
            }
            Place::Member { object, key } => {
                let flagged = self.consult_checker(object, key, info);
                let result = match object {
                    JsValue::Object(obj) => {
                        obj.borrow_mut().set_property(key.clone(), value);
                        Ok(())
                    }
                    _ => Err(JsError::type_error(
                        "Cannot set a property on a non-object value",
                    )),
                };
                if flagged {
                    self.check_flag = false;
                }
                result
            }
        }
    }

    fn evaluate_assignment(
        &mut self,
        operator: &str,
        left: &Expression,
        right: &Expression,
        site: &Expression,
    ) -> Result<JsValue, JsError> {
        let place = self.resolve_place(left)?;
        let value = if operator == "=" {
            self.evaluate(right)?
        } else {
            // `<op>=` rewrites to the binary operator applied to the
            // current value and the right-hand side
            let stripped = &operator[..operator.len() - 1];
            let op = self.ops.binary.get(stripped).copied().ok_or_else(|| {
                JsError::structural(format!("unknown assignment operator '{}'", operator))
            })?;
            let current = self.read_place(&place);
            let rhs = self.evaluate(right)?;
            op(&current, &rhs)?
        };
        let info = Some(self.site_info(site));
        self.write_place(&place, value.clone(), &info)?;
        Ok(value)
    }

    fn evaluate_update(
        &mut self,
        operator: &str,
        argument: &Expression,
        prefix: bool,
    ) -> Result<JsValue, JsError> {
        let place = self.resolve_place(argument)?;
        let op = self.ops.update.get(operator).copied().ok_or_else(|| {
            JsError::structural(format!("unknown update operator '{}'", operator))
        })?;
        let original = JsValue::Number(self.read_place(&place).to_number());
        let updated = op(&original);
        self.write_place(&place, updated.clone(), &None)?;
        Ok(if prefix { updated } else { original })
    }

    fn evaluate_unary(
        &mut self,
        operator: &str,
        argument: &Expression,
    ) -> Result<JsValue, JsError> {
        if operator == "delete" {
            return self.evaluate_delete(argument);
        }
        let value = self.evaluate(argument)?;
        let op = self.ops.unary.get(operator).copied().ok_or_else(|| {
            JsError::structural(format!("unknown unary operator '{}'", operator))
        })?;
        op(&value)
    }

    /// `delete` needs the reference, not the value: a member deletes on
    /// its receiver, a bare identifier deletes on the host context
    fn evaluate_delete(&mut self, argument: &Expression) -> Result<JsValue, JsError> {
        let place = self.resolve_place(argument)?;
        let deleted = match place {
            Place::Var(name) => match self.context.as_object() {
                Some(ctx) => ctx
                    .borrow_mut()
                    .delete_property(&PropertyKey::from(name.as_str())),
                None => true,
            },
            Place::Member { object, key } => match object.as_object() {
                Some(obj) => obj.borrow_mut().delete_property(&key),
                None => true,
            },
        };
        Ok(JsValue::Boolean(deleted))
    }

    // ============ FUNCTIONS AND CALLS ============

    /// Build a callable from a function expression or declaration. The
    /// current closure stack is snapshotted; a named function gets an
    /// extra frame on the snapshot binding its own name to itself, which
    /// callers never see.
    fn make_function(
        &mut self,
        id: Option<&Identifier>,
        params: &[Identifier],
        body: &Block,
    ) -> Result<JsValue, JsError> {
        let mut captured = self.scopes.capture();
        let self_frame = id.map(|_| {
            captured.push_frame();
            captured.innermost()
        });
        let agent = FunctionAgent {
            name: id.map(|i| JsString::from(i.name.as_str())),
            params: params
                .iter()
                .map(|p| JsString::from(p.name.as_str()))
                .collect(),
            hoistings: hoist::hoisted_names(&body.body).into(),
            body: body.body.clone().into(),
            closure: captured,
            script_url: self.script_url.clone(),
        };
        let func = create_function(JsFunction::Interpreted(agent));
        if let (Some(frame), Some(ident)) = (self_frame, id) {
            frame
                .borrow_mut()
                .insert(ident.name.as_str().into(), JsValue::Object(func.clone()));
        }
        Ok(JsValue::Object(func))
    }

    fn evaluate_call(
        &mut self,
        callee: &Expression,
        arguments: &[Expression],
        site: &Expression,
    ) -> Result<JsValue, JsError> {
        let target = match callee {
            Expression::MemberExpression {
                object,
                property,
                computed,
            } => {
                let object = self.evaluate(object)?;
                let key = self.property_key(property, *computed)?;
                CallTarget::Method { object, key }
            }
            _ => CallTarget::Direct(self.evaluate(callee)?),
        };
        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.evaluate(arg)?);
        }
        match target {
            CallTarget::Direct(func) => self.invoke(func, JsValue::Undefined, &args),
            CallTarget::Method { object, key } => {
                let info = Some(self.site_info(site));
                let flagged = self.consult_checker(&object, &key, &info);
                let method = self.member_read(&object, &key);
                let result = self.invoke(method, object, &args);
                if flagged {
                    self.check_flag = false;
                }
                result
            }
        }
    }

    fn evaluate_new(
        &mut self,
        callee: &Expression,
        arguments: &[Expression],
    ) -> Result<JsValue, JsError> {
        let constructor = self.evaluate(callee)?;
        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.evaluate(arg)?);
        }
        let instance = create_object();
        if let Some(ctor) = constructor.as_object() {
            if let Some(JsValue::Object(proto)) =
                ctor.borrow().get_property(&PropertyKey::from("prototype"))
            {
                instance.borrow_mut().prototype = Some(proto);
            }
        }
        let result = self.invoke(constructor, JsValue::Object(instance.clone()), &args)?;
        Ok(match result {
            JsValue::Object(_) => result,
            _ => JsValue::Object(instance),
        })
    }

    /// Call a function value with an explicit receiver. A null or
    /// undefined receiver falls back to the host context.
    pub fn invoke(
        &mut self,
        callee: JsValue,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        enum Callable {
            Interpreted(FunctionAgent),
            Native(NativeFunction),
        }
        let JsValue::Object(obj) = &callee else {
            return Err(JsError::type_error(format!(
                "{} is not a function",
                callee.to_js_string()
            )));
        };
        let callable = {
            let borrowed = obj.borrow();
            match &borrowed.exotic {
                ExoticObject::Function(JsFunction::Interpreted(agent)) => {
                    Callable::Interpreted(agent.clone())
                }
                ExoticObject::Function(JsFunction::Native(native)) => {
                    Callable::Native(native.clone())
                }
                _ => {
                    return Err(JsError::type_error(format!(
                        "{} is not a function",
                        callee.to_js_string()
                    )))
                }
            }
        };
        match callable {
            Callable::Interpreted(agent) => self.call_interpreted(&agent, this, args),
            Callable::Native(native) => (native.func)(self, this, args),
        }
    }

    /// The invocation protocol: install the captured environment, push a
    /// frame, pre-bind hoistings, bind `this`/`arguments`/parameters, run
    /// the body, and restore the outer environment on every exit path.
    /// The return signal never escapes the call.
    fn call_interpreted(
        &mut self,
        agent: &FunctionAgent,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        tracing::trace!(
            name = agent.name.as_deref().unwrap_or("<anonymous>"),
            args = args.len(),
            "entering function"
        );
        let saved_url = mem::replace(&mut self.script_url, agent.script_url.clone());
        let saved_scopes = mem::replace(&mut self.scopes, agent.closure.clone());
        self.scopes.push_frame();
        for name in agent.hoistings.iter() {
            self.scopes.define(name.clone(), JsValue::Undefined);
        }
        let receiver = if this.is_null_or_undefined() {
            self.context.clone()
        } else {
            this
        };
        self.scopes.define("this", receiver);
        self.scopes
            .define("arguments", JsValue::Object(create_array(args.to_vec())));
        for (index, param) in agent.params.iter().enumerate() {
            self.scopes.define(
                param.clone(),
                args.get(index).cloned().unwrap_or(JsValue::Undefined),
            );
        }

        let result = self.run_statements(&agent.body);

        self.scopes = saved_scopes;
        self.script_url = saved_url;
        self.flow.clear_return();
        result
    }

    // ============ CHECKER HOOK ============

    /// Ask the checker about a site with a receiver. On a hit the flag is
    /// raised (suppressing nested bookkeeping) and the collection grows;
    /// the caller must lower the flag once the operation finishes, on
    /// error paths included.
    fn consult_checker(
        &mut self,
        caller: &JsValue,
        callee: &PropertyKey,
        info: &Option<SiteInfo>,
    ) -> bool {
        if self.check_flag {
            return false;
        }
        let Some(checker) = self.checker.clone() else {
            return false;
        };
        let request = CheckRequest {
            context: &self.context,
            caller,
            callee,
        };
        let Some(status) = checker.dispatch(&request) else {
            return false;
        };
        tracing::debug!(kind = %status.kind, key = %callee, "checker hit");
        self.check_flag = true;
        self.record_hit(status, caller, info);
        true
    }

    /// Resolve the element(s) a hit is attributed to and append entries
    fn record_hit(&mut self, status: CheckStatus, caller: &JsValue, info: &Option<SiteInfo>) {
        let target = status.target.unwrap_or_else(|| match caller.host_class() {
            Some(HostClass::CssStyleDeclaration | HostClass::DomTokenList) => caller
                .as_object()
                .and_then(|obj| obj.borrow().get_property(&PropertyKey::from("parent")))
                .unwrap_or_else(|| caller.clone()),
            Some(HostClass::Attr) => caller
                .as_object()
                .and_then(|obj| {
                    obj.borrow()
                        .get_property(&PropertyKey::from("ownerElement"))
                })
                .unwrap_or_else(|| caller.clone()),
            _ => caller.clone(),
        });
        let elements = match target.host_class() {
            Some(HostClass::JQuery) => target
                .as_object()
                .map(host::jquery_elements)
                .unwrap_or_default(),
            _ => vec![target],
        };
        for element in elements {
            self.collection
                .append(element, status.kind.clone(), info.clone());
        }
    }

    fn site_info(&self, expr: &Expression) -> SiteInfo {
        SiteInfo {
            code: codegen::expr_to_source(expr),
            script_url: self.script_url.clone(),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
